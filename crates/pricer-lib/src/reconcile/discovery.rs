//! Schema discovery
//!
//! Recovers the model's expected input shape from whichever metadata queries
//! it answers, in a fixed priority order.

use crate::model::{FeatureMetadata, TrainedModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest vector length ever allocated when the count is unknown
pub const MIN_FEATURE_COUNT: usize = 3;

/// Where the expected feature count came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSource {
    ModelFeatureNames,
    BoosterFeatureNames,
    ModelFeatureCount,
    BoosterFeatureCount,
    /// No metadata source answered; the count is a guess
    Default,
}

/// Input schema recovered from a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Ordered feature names, empty when the model exposes none
    pub feature_names: Vec<Option<String>>,
    pub expected_count: usize,
    pub count_source: CountSource,
}

impl ModelSchema {
    pub fn count_known(&self) -> bool {
        self.count_source != CountSource::Default
    }

    pub fn has_names(&self) -> bool {
        !self.feature_names.is_empty()
    }

    /// User-facing warning shown when the count had to be guessed
    pub fn warning(&self) -> Option<String> {
        if self.count_known() {
            return None;
        }
        Some(format!(
            "Could not determine how many features the model expects; assuming {}. \
             Predictions may fail.",
            self.expected_count
        ))
    }
}

/// Walk the metadata sources in priority order:
/// model names, booster names, model count, booster count.
pub fn discover_schema(model: &dyn TrainedModel) -> ModelSchema {
    let secondary = model.secondary();

    let names = model
        .feature_names()
        .filter(|n| !n.is_empty())
        .map(|n| (n, CountSource::ModelFeatureNames))
        .or_else(|| {
            secondary
                .and_then(|s| s.feature_names())
                .filter(|n| !n.is_empty())
                .map(|n| (n, CountSource::BoosterFeatureNames))
        });

    if let Some((feature_names, count_source)) = names {
        let schema = ModelSchema {
            expected_count: feature_names.len(),
            feature_names,
            count_source,
        };
        debug!(source = ?schema.count_source, expected = schema.expected_count, "Feature names discovered");
        return schema;
    }

    let count = model
        .feature_count()
        .filter(|&n| n > 0)
        .map(|n| (n, CountSource::ModelFeatureCount))
        .or_else(|| {
            secondary
                .and_then(|s| s.feature_count())
                .filter(|&n| n > 0)
                .map(|n| (n, CountSource::BoosterFeatureCount))
        });

    let (expected_count, count_source) = count.unwrap_or_else(|| {
        let declared = model.declared_input_count().unwrap_or(MIN_FEATURE_COUNT);
        (declared.max(MIN_FEATURE_COUNT), CountSource::Default)
    });

    debug!(source = ?count_source, expected = expected_count, "Feature count discovered");
    ModelSchema {
        feature_names: Vec::new(),
        expected_count,
        count_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricerError;
    use crate::model::LinearModel;

    /// Model whose every metadata answer can be scripted
    #[derive(Default)]
    struct Scripted {
        names: Option<Vec<Option<String>>>,
        count: Option<usize>,
        booster: Option<BoosterMeta>,
        declared: Option<usize>,
    }

    #[derive(Default)]
    struct BoosterMeta {
        names: Option<Vec<Option<String>>>,
        count: Option<usize>,
    }

    impl FeatureMetadata for BoosterMeta {
        fn feature_names(&self) -> Option<Vec<Option<String>>> {
            self.names.clone()
        }
        fn feature_count(&self) -> Option<usize> {
            self.count
        }
    }

    impl FeatureMetadata for Scripted {
        fn feature_names(&self) -> Option<Vec<Option<String>>> {
            self.names.clone()
        }
        fn feature_count(&self) -> Option<usize> {
            self.count
        }
    }

    impl TrainedModel for Scripted {
        fn kind(&self) -> &'static str {
            "scripted"
        }
        fn predict(&self, _rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError> {
            Err(PricerError::prediction("not used"))
        }
        fn secondary(&self) -> Option<&dyn FeatureMetadata> {
            self.booster.as_ref().map(|b| b as &dyn FeatureMetadata)
        }
        fn declared_input_count(&self) -> Option<usize> {
            self.declared
        }
    }

    fn names(list: &[&str]) -> Option<Vec<Option<String>>> {
        Some(list.iter().map(|s| Some(s.to_string())).collect())
    }

    #[test]
    fn test_model_names_win() {
        let model = Scripted {
            names: names(&["year", "mileage", "cylinders", "color_red"]),
            count: Some(10),
            booster: Some(BoosterMeta {
                names: names(&["a"]),
                count: Some(1),
            }),
            ..Default::default()
        };
        let schema = discover_schema(&model);
        assert_eq!(schema.expected_count, 4);
        assert_eq!(schema.count_source, CountSource::ModelFeatureNames);
        assert!(schema.warning().is_none());
    }

    #[test]
    fn test_booster_names_when_model_has_none() {
        let model = Scripted {
            names: Some(Vec::new()),
            booster: Some(BoosterMeta {
                names: names(&["f_a", "f_b"]),
                count: None,
            }),
            ..Default::default()
        };
        let schema = discover_schema(&model);
        assert_eq!(schema.count_source, CountSource::BoosterFeatureNames);
        assert_eq!(schema.expected_count, 2);
        assert!(schema.has_names());
    }

    #[test]
    fn test_model_count_then_booster_count() {
        let model = Scripted {
            count: Some(7),
            booster: Some(BoosterMeta {
                names: None,
                count: Some(9),
            }),
            ..Default::default()
        };
        let schema = discover_schema(&model);
        assert_eq!(schema.expected_count, 7);
        assert_eq!(schema.count_source, CountSource::ModelFeatureCount);

        let model = Scripted {
            count: Some(0),
            booster: Some(BoosterMeta {
                names: None,
                count: Some(9),
            }),
            ..Default::default()
        };
        let schema = discover_schema(&model);
        assert_eq!(schema.expected_count, 9);
        assert_eq!(schema.count_source, CountSource::BoosterFeatureCount);
        assert!(!schema.has_names());
    }

    #[test]
    fn test_total_failure_defaults_to_three_with_warning() {
        let schema = discover_schema(&Scripted::default());
        assert_eq!(schema.expected_count, 3);
        assert_eq!(schema.count_source, CountSource::Default);
        assert!(schema.warning().unwrap().contains("Predictions may fail"));
    }

    #[test]
    fn test_default_uses_declared_count_when_larger() {
        let model = Scripted {
            declared: Some(8),
            ..Default::default()
        };
        assert_eq!(discover_schema(&model).expected_count, 8);

        let model = Scripted {
            declared: Some(1),
            ..Default::default()
        };
        assert_eq!(discover_schema(&model).expected_count, 3);
    }

    #[test]
    fn test_linear_model_without_metadata() {
        let model = LinearModel::new(0.0, vec![1.0; 5]);
        let schema = discover_schema(&model);
        assert_eq!(schema.expected_count, 5);
        assert!(!schema.count_known());
    }
}
