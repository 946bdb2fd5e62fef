use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentmate_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: RENTMATE_CONFIG env > ~/.rentmate/rentmate.toml; env vars
    // override either. Model and store credentials are required, so a load
    // failure is fatal rather than degraded.
    let config_path = std::env::var("RENTMATE_CONFIG").ok();
    let config = rentmate_core::config::RentmateConfig::load(config_path.as_deref())?;

    let bind = config.server.bind.clone();
    let port = config.server.port;
    info!(
        model = %config.model.name,
        store = %config.store.url,
        "configuration loaded"
    );

    let state = Arc::new(app::AppState::new(config));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Rentmate gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
