//! ONNX regression models run through tract
//!
//! ONNX graphs carry no per-column feature names; the only metadata exposed is
//! the input width, read from the last dimension of the first input when it is
//! concrete.

use super::{FeatureMetadata, TrainedModel};
use crate::error::PricerError;
use std::time::Instant;
use tract_onnx::prelude::*;
use tract_onnx::tract_hir::internal::DimLike;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based regression model
pub struct OnnxModel {
    plan: TractModel,
    input_width: Option<usize>,
}

impl OnnxModel {
    /// Parse, type and optimize an ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, PricerError> {
        let typed = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .map_err(|e| PricerError::Onnx(format!("failed to parse ONNX model: {e}")))?
            .into_typed()
            .map_err(|e| PricerError::Onnx(format!("failed to type ONNX model: {e}")))?;

        let input_width = typed
            .input_fact(0)
            .ok()
            .and_then(|fact| fact.shape.last().and_then(|dim| dim.to_usize().ok()))
            .filter(|&n| n > 0);

        let plan = typed
            .into_optimized()
            .map_err(|e| PricerError::Onnx(format!("failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| PricerError::Onnx(format!("failed to create runnable model: {e}")))?;

        debug!(input_width = ?input_width, "ONNX model loaded");
        Ok(Self { plan, input_width })
    }

    fn rows_to_tensor(&self, rows: &[Vec<f64>]) -> Result<Tensor, PricerError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(expected) = self.input_width {
            if width != expected {
                return Err(PricerError::prediction(format!(
                    "input has {width} features, but the ONNX model expects {expected}"
                )));
            }
        }
        if rows.iter().any(|r| r.len() != width) {
            return Err(PricerError::prediction("input rows have different lengths"));
        }

        let data: Vec<f32> = rows.iter().flatten().map(|&v| v as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((rows.len(), width), data)
            .map_err(|e| PricerError::prediction(format!("invalid input shape: {e}")))?;
        Ok(array.into())
    }
}

impl FeatureMetadata for OnnxModel {
    fn feature_count(&self) -> Option<usize> {
        self.input_width
    }
}

impl TrainedModel for OnnxModel {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, PricerError> {
        let start = Instant::now();
        let input = self.rows_to_tensor(rows)?;

        let result = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| PricerError::prediction(format!("ONNX inference failed: {e}")))?;
        let output = result
            .first()
            .ok_or_else(|| PricerError::prediction("no output from model"))?;
        let values: Vec<f64> = output
            .to_array_view::<f32>()
            .map_err(|e| PricerError::prediction(format!("unexpected output tensor: {e}")))?
            .iter()
            .map(|&v| v as f64)
            .collect();

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(values)
    }
}
