//! Error types for model loading and prediction

use thiserror::Error;

/// Errors raised by the pricer library.
///
/// Only [`PricerError::Prediction`] can occur while serving a request; the
/// other variants are startup failures raised while loading the model artifact.
#[derive(Debug, Error)]
pub enum PricerError {
    #[error("failed to read model artifact '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    #[error("invalid model artifact: {0}")]
    Artifact(String),

    #[error("unsupported model format '{0}' (expected .json or .onnx)")]
    UnsupportedFormat(String),

    #[error("ONNX model error: {0}")]
    Onnx(String),

    #[error("{0}")]
    Prediction(String),
}

impl PricerError {
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction(message.into())
    }

    /// True for errors raised by the predict call itself.
    pub fn is_prediction_failure(&self) -> bool {
        matches!(self, Self::Prediction(_))
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Artifact(err.to_string())
    }
}
