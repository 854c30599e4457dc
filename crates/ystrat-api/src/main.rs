//! Playground server binary.

use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ystrat_api::{create_router, ApiConfig, AppState};
use ystrat_pipeline::PipelineConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ystrat=info")),
        )
        .init();

    info!("Starting ystrat-api");

    let api_config = ApiConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();

    let state = match AppState::new(&pipeline_config).await {
        Ok(state) => state,
        Err(err) => {
            error!("failed to build application state: {err}");
            std::process::exit(1);
        }
    };

    let app = create_router(state, api_config.max_body_bytes);

    // Loopback only: the playground is unauthenticated by design.
    let addr: SocketAddr = format!("{}:{}", ApiConfig::HOST, api_config.port)
        .parse()
        .expect("invalid bind address");

    info!("Listening on http://{addr}");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {err}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
