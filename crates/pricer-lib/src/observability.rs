//! Observability infrastructure for the price predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes, schema state, placements)
//! - Structured JSON logging with tracing

use crate::models::KnownInput;
use crate::reconcile::{ModelSchema, Reconciliation};
use crate::PricerError;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PricerMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct PricerMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions: IntCounter,
    prediction_errors: IntCounter,
    expected_features: IntGauge,
    schema_known: IntGauge,
    model_info: GaugeVec,
    name_mapped_inputs: IntCounter,
    positional_inputs: IntCounter,
    dropped_inputs: IntCounter,
}

impl PricerMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "vehicle_pricer_prediction_latency_seconds",
                "Time spent in the model predict call",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions: register_int_counter!(
                "vehicle_pricer_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors: register_int_counter!(
                "vehicle_pricer_prediction_errors_total",
                "Total number of failed predict calls"
            )
            .expect("Failed to register prediction_errors_total"),

            expected_features: register_int_gauge!(
                "vehicle_pricer_expected_features",
                "Feature vector length used for the loaded model"
            )
            .expect("Failed to register expected_features"),

            schema_known: register_int_gauge!(
                "vehicle_pricer_schema_known",
                "1 if the expected feature count was discovered, 0 if defaulted"
            )
            .expect("Failed to register schema_known"),

            model_info: register_gauge_vec!(
                "vehicle_pricer_model_info",
                "Information about the loaded model",
                &["kind"]
            )
            .expect("Failed to register model_info"),

            name_mapped_inputs: register_int_counter!(
                "vehicle_pricer_name_mapped_inputs_total",
                "Known inputs written to a slot located by feature name"
            )
            .expect("Failed to register name_mapped_inputs_total"),

            positional_inputs: register_int_counter!(
                "vehicle_pricer_positional_inputs_total",
                "Known inputs written to a slot by positional fallback"
            )
            .expect("Failed to register positional_inputs_total"),

            dropped_inputs: register_int_counter!(
                "vehicle_pricer_dropped_inputs_total",
                "Known inputs that found no slot in the feature vector"
            )
            .expect("Failed to register dropped_inputs_total"),
        }
    }
}

/// Metrics handle for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PricerMetrics {
    _private: (),
}

impl Default for PricerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PricerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PricerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PricerMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    /// Publish the discovered schema and model kind
    pub fn set_schema(&self, kind: &str, expected_features: usize, known: bool) {
        self.inner().expected_features.set(expected_features as i64);
        self.inner().schema_known.set(i64::from(known));
        self.inner().model_info.reset();
        self.inner().model_info.with_label_values(&[kind]).set(1.0);
    }

    /// Count how each known input reached the vector
    pub fn record_reconciliation(&self, reconciliation: &Reconciliation) {
        let inner = self.inner();
        inner.name_mapped_inputs.inc_by(reconciliation.mapped.len() as u64);
        inner.positional_inputs.inc_by(reconciliation.positional.len() as u64);
        inner.dropped_inputs.inc_by(reconciliation.dropped.len() as u64);
    }
}

/// Structured logger for pricing events
#[derive(Clone)]
pub struct StructuredLogger {
    model_kind: String,
}

impl StructuredLogger {
    pub fn new(model_kind: impl Into<String>) -> Self {
        Self {
            model_kind: model_kind.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_path: &str) {
        info!(
            event = "pricer_started",
            model_kind = %self.model_kind,
            version = %version,
            model_path = %model_path,
            "Vehicle price predictor started"
        );
    }

    pub fn log_schema(&self, schema: &ModelSchema) {
        if schema.count_known() {
            info!(
                event = "schema_discovered",
                model_kind = %self.model_kind,
                expected_features = schema.expected_count,
                named_features = schema.feature_names.len(),
                source = ?schema.count_source,
                "Model input schema discovered"
            );
        } else {
            warn!(
                event = "schema_unknown",
                model_kind = %self.model_kind,
                expected_features = schema.expected_count,
                "Could not discover model input schema, using default feature count"
            );
        }
    }

    pub fn log_prediction(&self, price: f64, expected_features: usize, name_mapped: usize) {
        info!(
            event = "prediction_generated",
            model_kind = %self.model_kind,
            price = price,
            expected_features = expected_features,
            name_mapped_inputs = name_mapped,
            "Generated price prediction"
        );
    }

    pub fn log_prediction_failure(&self, error: &PricerError) {
        warn!(
            event = "prediction_failed",
            model_kind = %self.model_kind,
            error = %error,
            "Model predict call failed"
        );
    }

    pub fn log_dropped_inputs(&self, dropped: &[KnownInput]) {
        let names: Vec<&str> = dropped.iter().map(KnownInput::name).collect();
        warn!(
            event = "inputs_dropped",
            model_kind = %self.model_kind,
            dropped = ?names,
            "Inputs had no slot in the feature vector"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "pricer_shutdown",
            model_kind = %self.model_kind,
            reason = %reason,
            "Vehicle price predictor shutting down"
        );
    }
}
