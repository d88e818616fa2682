//! Gradient-boosted tree ensemble adapter
//!
//! The outer model carries only the base score; feature metadata lives on the
//! internal [`Booster`], the same split a boosting library makes between its
//! estimator wrapper and the booster it trains.

use super::{FeatureMetadata, TrainedModel};
use crate::error::PricerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub booster: Booster,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_features: Option<usize>,
    pub trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

/// A tree node; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

fn default_left() -> bool {
    true
}

impl RegressionTree {
    /// Walk from the root to a leaf. Rows go left when `x < threshold` and
    /// NaN follows `default_left`.
    fn evaluate(&self, row: &[f64]) -> Result<f64, PricerError> {
        let mut idx = 0usize;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| PricerError::prediction(format!("tree node {idx} does not exist")))?;
            match node {
                TreeNode::Leaf { leaf } => return Ok(*leaf),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = *row.get(*feature).ok_or_else(|| {
                        PricerError::prediction(format!(
                            "feature index {feature} out of range for input with {} features",
                            row.len()
                        ))
                    })?;
                    idx = if x.is_nan() {
                        if *default_left { *left } else { *right }
                    } else if x < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        Err(PricerError::prediction("tree contains a cycle"))
    }
}

impl Booster {
    fn margin(&self, row: &[f64]) -> Result<f64, PricerError> {
        if let Some(expected) = self.feature_count() {
            if row.len() != expected {
                return Err(PricerError::prediction(format!(
                    "feature_names mismatch: booster expects {expected} features, got {}",
                    row.len()
                )));
            }
        }
        self.trees.iter().map(|t| t.evaluate(row)).sum()
    }
}

impl FeatureMetadata for Booster {
    fn feature_names(&self) -> Option<Vec<Option<String>>> {
        self.feature_names.clone().filter(|names| !names.is_empty())
    }

    fn feature_count(&self) -> Option<usize> {
        self.num_features
            .or_else(|| self.feature_names.as_ref().map(Vec::len))
            .filter(|&n| n > 0)
    }
}

// The estimator wrapper does not advertise metadata itself.
impl FeatureMetadata for TreeEnsemble {}

impl TrainedModel for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError> {
        rows.iter()
            .map(|row| Ok(self.base_score + self.booster.margin(row)?))
            .collect()
    }

    fn secondary(&self) -> Option<&dyn FeatureMetadata> {
        Some(&self.booster)
    }
}
