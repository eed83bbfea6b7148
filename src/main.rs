use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use dotenvy::dotenv;
use tracing::{error, info};

mod config;
mod db;
mod error;
mod handlers;
mod prompt;
mod provider;
mod state;
mod utils;

use config::CONFIG;
use db::database::Database;
use provider::ReplicateClient;
use state::AppState;
use utils::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guards = init_logging();

    info!("Starting avatar portrait service");

    let db = Database::init(&CONFIG.database_url).await?;
    let provider = ReplicateClient::from_config();
    let state = AppState::new(db, provider);

    let app = Router::new()
        .route("/healthz", get(handlers::health))
        .route(
            "/api/avatars",
            get(handlers::avatars::list_avatars).post(handlers::avatars::create_avatar),
        )
        .route(
            "/api/generate-avatar-image",
            post(handlers::generate::generate_avatar_image),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&CONFIG.bind_addr).await?;
    info!("Listening on {}", CONFIG.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
