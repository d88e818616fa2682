//! Vehicle Pricer - single-page used-vehicle price prediction service
//!
//! Loads one trained regression model at startup, discovers its input schema,
//! and serves a form that turns year, mileage, cylinders and optional
//! categorical choices into a price estimate.

use anyhow::{Context, Result};
use pricer_lib::{
    health::{components, HealthRegistry},
    model::load_model,
    observability::{PricerMetrics, StructuredLogger},
    PriceEstimator,
};
use pricer_server::{
    api,
    config::{LogFormat, ServerConfig},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PRICER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Initialize tracing with env filter and the configured output format
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init(),
    }

    info!(model_path = %config.model_path.display(), "Starting vehicle-pricer");

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL).await;
    health_registry.register(components::SCHEMA).await;

    // Load the model; the service does not start without one
    let model = load_model(&config.model_path, config.model_sha256.as_deref())
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;

    let estimator = PriceEstimator::new(model);
    if let Some(warning) = estimator.schema().warning() {
        warn!(%warning, "Model schema incomplete");
        health_registry
            .set_degraded(components::SCHEMA, warning)
            .await;
    }

    let metrics = PricerMetrics::new();
    let logger = StructuredLogger::new(estimator.model_kind());
    logger.log_startup(PRICER_VERSION, &config.model_path.display().to_string());

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        estimator,
        health_registry.clone(),
        metrics,
    ));

    health_registry.set_ready(true).await;

    let addr = config.bind_addr();
    tokio::select! {
        result = api::serve(addr, app_state) => {
            result.context("HTTP server exited")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
            info!("Shutting down");
        }
    }

    Ok(())
}
