mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod state;
mod store;

use anyhow::Context;
use config::Config;
use state::AppState;
use std::sync::Arc;
use store::StoreClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("rust-object-proxy starting");

    let config = Config::from_env()?;
    config.log_startup();

    let store = StoreClient::from_config(&config)?;

    let state = AppState {
        store,
        config: Arc::new(config),
    };

    let addr = format!(
        "{}:{}",
        state.config.service_host, state.config.service_port
    );
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
