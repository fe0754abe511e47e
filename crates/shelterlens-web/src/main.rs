//! ShelterLens web server
//!
//! Run with: cargo run -p shelterlens-web --bin shelterlens

use shelterlens_common::LocatorConfig;
use shelterlens_web::{router::build_router, state::AppState, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    info!("Starting ShelterLens web server...");

    let config = LocatorConfig::load_or_default()?;
    let addr = config.bind_addr();

    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
