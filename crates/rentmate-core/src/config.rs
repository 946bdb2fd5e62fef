use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (rentmate.toml + RENTMATE_* env overrides).
///
/// Secrets (model API key, store service key) are usually supplied through
/// the environment: nested keys are addressed with a double underscore,
/// e.g. `RENTMATE_MODEL__API_KEY`, `RENTMATE_STORE__SERVICE_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentmateConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Hosted model access: API key plus the gateway base URL requests go
/// through. The defaults target the public Gemini REST endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_key: String,
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Remote relational store (Supabase project URL + service-role key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Base URL the synthetic checkout links point at.
    #[serde(default = "default_checkout_base_url")]
    pub checkout_base_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            checkout_base_url: default_checkout_base_url(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_model_name() -> String {
    "gemini-2.0-flash-lite".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_checkout_base_url() -> String {
    "https://pay.rentmate.app".to_string()
}

impl RentmateConfig {
    /// Load config from a TOML file with RENTMATE_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.rentmate/rentmate.toml
    /// Env vars win over the file either way.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        if !std::path::Path::new(&path).exists() {
            debug!(path = %path, "config file not found, relying on env vars");
        }

        let config: RentmateConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RENTMATE_").split("__"))
            .extract()
            .map_err(|e| crate::error::RentmateError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.rentmate/rentmate.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_fill_required_secrets() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RENTMATE_MODEL__API_KEY", "test-model-key");
            jail.set_env("RENTMATE_STORE__URL", "https://proj.supabase.co");
            jail.set_env("RENTMATE_STORE__SERVICE_KEY", "service-role-key");

            let config = RentmateConfig::load(Some("does-not-exist.toml"))
                .map_err(|e| figment::Error::from(e.to_string()))?;

            assert_eq!(config.model.api_key, "test-model-key");
            assert_eq!(config.store.url, "https://proj.supabase.co");
            assert_eq!(config.store.service_key, "service-role-key");
            // defaults fill the rest
            assert_eq!(config.server.port, DEFAULT_PORT);
            assert_eq!(config.model.name, "gemini-2.0-flash-lite");
            Ok(())
        });
    }

    #[test]
    fn missing_secrets_fail_loudly() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let err = RentmateConfig::load(Some("does-not-exist.toml"))
                .expect_err("config without model/store must not load");
            assert_eq!(err.code(), "CONFIG_ERROR");
            Ok(())
        });
    }

    #[test]
    fn toml_file_provides_base_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "rentmate.toml",
                r#"
                [server]
                port = 9900

                [model]
                api_key = "file-key"

                [store]
                url = "https://proj.supabase.co"
                service_key = "file-service-key"
                "#,
            )?;
            jail.set_env("RENTMATE_MODEL__API_KEY", "env-key");

            let config = RentmateConfig::load(Some("rentmate.toml"))
                .map_err(|e| figment::Error::from(e.to_string()))?;

            assert_eq!(config.server.port, 9900);
            // env wins over the file
            assert_eq!(config.model.api_key, "env-key");
            assert_eq!(config.payment.checkout_base_url, "https://pay.rentmate.app");
            Ok(())
        });
    }
}
