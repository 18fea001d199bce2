//! REST server binary for the course-preference portal.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coursechoice::api::build_router;
use coursechoice::database::{DatabaseConfig, DatabaseManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coursechoice=info,tower_http=info")),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let db = DatabaseManager::new(DatabaseConfig::default())
        .await
        .context("failed to create database pool")?;
    db.test_connection()
        .await
        .context("database connectivity check failed")?;

    let app = build_router(db.pool().clone());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");
    info!("Starting portal server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
