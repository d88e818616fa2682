//! Linear regression adapter
//!
//! Mirrors the shape of a scikit-learn linear estimator exported to JSON:
//! coefficients and intercept, plus the optional `feature_names_in_` /
//! `n_features_in_` metadata recorded when the model was fit.

use super::{FeatureMetadata, TrainedModel};
use crate::error::PricerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features_in: Option<usize>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
            feature_names: None,
            n_features_in: None,
        }
    }

    pub fn with_feature_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.feature_names = Some(names.into_iter().map(|n| Some(n.into())).collect());
        self
    }

    pub fn with_feature_count(mut self, count: usize) -> Self {
        self.n_features_in = Some(count);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PricerError> {
        if self.coefficients.is_empty() {
            return Err(PricerError::Artifact(
                "linear model has no coefficients".to_string(),
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(PricerError::Artifact(format!(
                    "linear model lists {} feature names for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                )));
            }
        }
        Ok(())
    }
}

impl FeatureMetadata for LinearModel {
    fn feature_names(&self) -> Option<Vec<Option<String>>> {
        self.feature_names.clone().filter(|names| !names.is_empty())
    }

    fn feature_count(&self) -> Option<usize> {
        self.n_features_in.filter(|&n| n > 0)
    }
}

impl TrainedModel for LinearModel {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError> {
        rows.iter()
            .map(|row| {
                if row.len() != self.coefficients.len() {
                    return Err(PricerError::prediction(format!(
                        "X has {} features, but LinearModel is expecting {} features as input",
                        row.len(),
                        self.coefficients.len()
                    )));
                }
                let dot: f64 = row
                    .iter()
                    .zip(self.coefficients.iter())
                    .map(|(x, w)| x * w)
                    .sum();
                Ok(self.intercept + dot)
            })
            .collect()
    }

    fn declared_input_count(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }
}
