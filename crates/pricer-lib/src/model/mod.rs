//! Trained model adapters
//!
//! Each supported artifact shape gets one adapter implementing
//! [`TrainedModel`]. Adapters answer the optional metadata queries with a
//! definite `Some`/`None` instead of failing, so schema discovery can walk
//! them in priority order.

mod artifact;
mod ensemble;
mod linear;
mod onnx;

pub use artifact::{load_model, load_model_from_bytes, ModelArtifact};
pub use ensemble::{Booster, RegressionTree, TreeEnsemble, TreeNode};
pub use linear::LinearModel;
pub use onnx::OnnxModel;

use crate::error::PricerError;
use std::sync::Arc;

/// Shared, read-only model handle
pub type ModelHandle = Arc<dyn TrainedModel>;

/// Optional feature metadata a model (or one of its components) may expose
pub trait FeatureMetadata {
    /// Ordered input feature names; entries may be unnamed
    fn feature_names(&self) -> Option<Vec<Option<String>>> {
        None
    }

    /// Number of input features
    fn feature_count(&self) -> Option<usize> {
        None
    }
}

/// A pre-trained regression model
pub trait TrainedModel: FeatureMetadata + Send + Sync {
    /// Short adapter name used in logs and metrics
    fn kind(&self) -> &'static str;

    /// Predict one value per input row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError>;

    /// Internal component carrying its own metadata, such as a booster
    fn secondary(&self) -> Option<&dyn FeatureMetadata> {
        None
    }

    /// Input width implied by the model's parameters rather than advertised metadata
    fn declared_input_count(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl FeatureMetadata for Bare {}

    impl TrainedModel for Bare {
        fn kind(&self) -> &'static str {
            "bare"
        }

        fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError> {
            Ok(rows.iter().map(|r| r.iter().sum()).collect())
        }
    }

    #[test]
    fn test_metadata_defaults_to_absent() {
        let model: ModelHandle = Arc::new(Bare);
        assert!(model.feature_names().is_none());
        assert!(model.feature_count().is_none());
        assert!(model.secondary().is_none());
        assert!(model.declared_input_count().is_none());
        assert_eq!(model.predict(&[vec![1.0, 2.0]]).unwrap(), vec![3.0]);
    }
}
