//! HTTP API: the prediction form, its JSON twin, and health/metrics endpoints

use crate::form::{render_page, FormSubmission};
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use pricer_lib::{
    health::HealthRegistry,
    models::RawInputs,
    observability::PricerMetrics,
    PriceEstimator, PriceOutcome, SchemaReport,
};
use prometheus::{Encoder, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub estimator: PriceEstimator,
    pub health_registry: HealthRegistry,
    pub metrics: PricerMetrics,
}

impl AppState {
    pub fn new(
        estimator: PriceEstimator,
        health_registry: HealthRegistry,
        metrics: PricerMetrics,
    ) -> Self {
        Self {
            estimator,
            health_registry,
            metrics,
        }
    }
}

/// Render the empty form. `?show_categorical=on` pre-ticks the checkbox.
async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let submission = FormSubmission::parse(&params);
    Html(render_page(state.estimator.reconciler(), &submission, None))
}

/// Handle a form submission and re-render the page with the outcome
async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Html<String> {
    let submission = FormSubmission::parse(&fields);
    let outcome = state.estimator.estimate(&submission.inputs);
    Html(render_page(
        state.estimator.reconciler(),
        &submission,
        Some(&outcome),
    ))
}

async fn schema(State(state): State<Arc<AppState>>) -> Json<SchemaReport> {
    Json(state.estimator.schema_report())
}

/// JSON prediction. Out-of-range numbers are clamped, and a failed predict
/// call is still a 200 with a `"status": "failure"` body.
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(inputs): Json<RawInputs>,
) -> Json<PriceOutcome> {
    Json(state.estimator.estimate(&inputs.clamped()))
}

/// Health check response. Always 200 once serving; a guessed schema shows up
/// as `"status": "degraded"` in the body.
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.health_registry.health().await))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %err, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(submit_form))
        .route("/api/v1/schema", get(schema))
        .route("/api/v1/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(addr: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
