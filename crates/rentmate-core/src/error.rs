use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentmateError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("model provider error: {0}")]
    Provider(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RentmateError {
    /// Short error code string included in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RentmateError::Config(_) => "CONFIG_ERROR",
            RentmateError::InvalidRequest(_) => "INVALID_REQUEST",
            RentmateError::Catalog(_) => "CATALOG_ERROR",
            RentmateError::Provider(_) => "MODEL_PROVIDER_ERROR",
            RentmateError::Serialization(_) => "SERIALIZATION_ERROR",
            RentmateError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, RentmateError>;
