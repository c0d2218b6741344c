//! smartcert - Credential Verification Service
//!
//! Verifies submitted credentials (certificate images or documents) by
//! running them through an ordered pipeline of forensic analysis
//! stages and fusing the per-stage indicators into one classification
//! and confidence score.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use smartcert::config::AppConfig;
use smartcert::services::RemoteAnalyzer;
use smartcert::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting smartcert credential verification service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("Analyzer: {}", config.analyzer_base_url);
    info!("Database: {}", config.database_path.display());

    let pool = smartcert::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let analyzer = Arc::new(
        RemoteAnalyzer::new(config.analyzer_base_url.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build analyzer client: {}", e))?,
    );

    let bind_address = config.bind_address.clone();
    let state = AppState::new(config, pool, analyzer);
    let app = smartcert::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
