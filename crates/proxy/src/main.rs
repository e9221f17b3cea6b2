//! WML prediction proxy
//!
//! Serves `/api/predict`, forwarding machine sensor readings to a Watson
//! Machine Learning deployment, alongside health and metrics endpoints.

use anyhow::{Context, Result};
use proxy_lib::{
    api::{self, AppState},
    health::{components, HealthRegistry},
    observability::{ProxyMetrics, StructuredLogger},
    PredictionProxy,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const PROXY_VERSION: &str = env!("CARGO_PKG_VERSION");
const SERVICE_NAME: &str = "wml-proxy";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = config::ServiceConfig::load()?;
    let listen_addr = config.listen_addr();
    let credentials = config.credentials();

    let logger = StructuredLogger::new(SERVICE_NAME);
    logger.log_startup(PROXY_VERSION, &listen_addr, credentials.is_complete());
    info!(
        iam_token_url = %config.wml.iam_token_url,
        target_placeholder = config.wml.target_placeholder,
        request_timeout_secs = config.wml.request_timeout_secs,
        "Proxy configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::CREDENTIALS).await;
    health_registry.register(components::TOKEN_ISSUER).await;
    health_registry.register(components::PREDICTION_CLIENT).await;

    let missing = credentials.missing();
    if !missing.is_empty() {
        logger.log_missing_credentials(&missing);
    }
    health_registry.check_credentials(&missing).await;

    let proxy = PredictionProxy::from_config(config.proxy_config())
        .context("Failed to build prediction proxy")?;
    let metrics = ProxyMetrics::new();

    let app_state = Arc::new(AppState::new(
        Arc::new(proxy),
        health_registry,
        metrics,
        logger.clone(),
    ));

    let shutdown_logger = logger.clone();
    api::serve(&listen_addr, app_state, async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown_logger.log_shutdown("SIGINT received");
    })
    .await?;

    info!("Shutting down");
    Ok(())
}
