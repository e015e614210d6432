//! # Homeval Node
//!
//! Valuation service binary exposing the prediction API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod model;
mod state;

use config::NodeConfig;
use model::{LinearModel, ValuationModel};
use state::AppState;

/// Run the valuation service.
pub async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Homeval node starting...");

    let model = LinearModel::from_path(&config.model_path)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;
    info!(
        model = model.name(),
        columns = model.columns.len(),
        "Model loaded"
    );

    let state = AppState::new(Arc::new(model));
    let app = create_router(state);

    let addr = config.server.socket_addr()?;
    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router.
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/predict", post(api::predict::predict_price))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NodeConfig::load()?;
    run_server(config).await
}
