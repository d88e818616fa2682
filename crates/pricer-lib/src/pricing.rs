//! Request flow: inputs -> reconciled vector -> predict -> outcome

use crate::model::{ModelHandle, TrainedModel};
use crate::models::UserInputs;
use crate::observability::{PricerMetrics, StructuredLogger};
use crate::reconcile::{discover_schema, FeatureReconciler, ModelSchema, Reconciliation};
use crate::report::{PriceOutcome, SchemaReport};
use crate::PricerError;
use std::time::Instant;

/// Owns the loaded model and the reconciler built from its schema
pub struct PriceEstimator {
    model: ModelHandle,
    reconciler: FeatureReconciler,
    metrics: PricerMetrics,
    logger: StructuredLogger,
}

impl PriceEstimator {
    /// Run schema discovery once against `model`
    pub fn new(model: ModelHandle) -> Self {
        let schema = discover_schema(model.as_ref());
        let metrics = PricerMetrics::new();
        let logger = StructuredLogger::new(model.kind());
        metrics.set_schema(model.kind(), schema.expected_count, schema.count_known());
        logger.log_schema(&schema);
        Self {
            reconciler: FeatureReconciler::new(schema),
            model,
            metrics,
            logger,
        }
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn schema(&self) -> &ModelSchema {
        self.reconciler.schema()
    }

    pub fn reconciler(&self) -> &FeatureReconciler {
        &self.reconciler
    }

    pub fn schema_report(&self) -> SchemaReport {
        SchemaReport::new(self.model_kind(), &self.reconciler)
    }

    /// Build the vector and predict. A failing predict call becomes a
    /// `Failure` outcome; nothing is retried.
    pub fn estimate(&self, inputs: &UserInputs) -> PriceOutcome {
        let reconciliation = self.reconciler.build_vector(inputs);
        self.metrics.record_reconciliation(&reconciliation);
        if !reconciliation.dropped.is_empty() {
            self.logger.log_dropped_inputs(&reconciliation.dropped);
        }

        let start = Instant::now();
        let result = predict_one(self.model.as_ref(), &reconciliation);
        self.metrics
            .observe_prediction_latency(start.elapsed().as_secs_f64());

        match result {
            Ok(price) => {
                self.metrics.inc_predictions();
                self.logger.log_prediction(
                    price,
                    self.schema().expected_count,
                    reconciliation.mapped.len(),
                );
                PriceOutcome::success(price, &reconciliation, self.schema().expected_count)
            }
            Err(err) => {
                self.metrics.inc_prediction_errors();
                self.logger.log_prediction_failure(&err);
                PriceOutcome::failure(err)
            }
        }
    }
}

/// Predict a single row and take the first output
fn predict_one(model: &dyn TrainedModel, reconciliation: &Reconciliation) -> Result<f64, PricerError> {
    let rows = [reconciliation.vector.as_slice().to_vec()];
    model
        .predict(&rows)?
        .first()
        .copied()
        .ok_or_else(|| PricerError::prediction("model returned no predictions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureMetadata, LinearModel};
    use std::sync::Arc;

    struct Fixed(f64);

    impl FeatureMetadata for Fixed {
        fn feature_names(&self) -> Option<Vec<Option<String>>> {
            Some(vec![
                Some("year".to_string()),
                Some("mileage".to_string()),
                Some("cylinders".to_string()),
            ])
        }
    }

    impl TrainedModel for Fixed {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError> {
            assert_eq!(rows, &[vec![2020.0, 30000.0, 6.0]]);
            Ok(vec![self.0])
        }
    }

    struct Empty;

    impl FeatureMetadata for Empty {}

    impl TrainedModel for Empty {
        fn kind(&self) -> &'static str {
            "empty"
        }

        fn predict(&self, _rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_end_to_end_display() {
        let estimator = PriceEstimator::new(Arc::new(Fixed(18500.25)));
        let outcome = estimator.estimate(&UserInputs::new(2020, 30000, 6));
        let PriceOutcome::Success { display, vector, .. } = outcome else {
            panic!("expected success");
        };
        assert_eq!(display, "Predicted Vehicle Price: $18,500.25");
        assert_eq!(vector, vec![2020.0, 30000.0, 6.0]);
    }

    #[test]
    fn test_prediction_failure_is_reported() {
        // Advertised count disagrees with the coefficients.
        let model = LinearModel::new(0.0, vec![1.0; 5]).with_feature_count(4);
        let estimator = PriceEstimator::new(Arc::new(model));
        let outcome = estimator.estimate(&UserInputs::default());
        let PriceOutcome::Failure { message, .. } = outcome else {
            panic!("expected failure");
        };
        assert!(message.starts_with("Prediction failed: X has 4 features"));
    }

    #[test]
    fn test_empty_output_is_failure() {
        let estimator = PriceEstimator::new(Arc::new(Empty));
        let outcome = estimator.estimate(&UserInputs::default());
        assert!(!outcome.is_success());
        assert!(estimator.schema().warning().is_some());
    }
}
