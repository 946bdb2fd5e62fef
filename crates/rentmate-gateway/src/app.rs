use axum::{
    routing::{get, post},
    Router,
};
use rentmate_agent::{GeminiProvider, ModelProvider};
use rentmate_catalog::CatalogClient;
use rentmate_core::config::RentmateConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
///
/// Everything here is immutable after startup: one reqwest pool for the
/// store, one for the model API, shared across requests.
pub struct AppState {
    pub config: RentmateConfig,
    pub catalog: Arc<CatalogClient>,
    pub provider: Box<dyn ModelProvider>,
}

impl AppState {
    pub fn new(config: RentmateConfig) -> Self {
        let catalog = Arc::new(CatalogClient::new(
            config.store.url.clone(),
            config.store.service_key.clone(),
        ));
        let provider = Box::new(GeminiProvider::new(
            config.model.api_key.clone(),
            Some(config.model.base_url.clone()),
        ));
        Self {
            config,
            catalog,
            provider,
        }
    }

    /// Build state around an existing catalog client and provider.
    /// Used by tests to point both at mock servers.
    pub fn with_parts(
        config: RentmateConfig,
        catalog: CatalogClient,
        provider: Box<dyn ModelProvider>,
    ) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            provider,
        }
    }
}

/// Assemble the full Axum router. The chat endpoint is called by browsers
/// on other origins, so CORS stays wide open.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::http::ui::ui_handler))
        .route("/health", get(crate::http::health::health_handler))
        .route("/items", post(crate::http::items::items_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
