//! Model artifact loading
//!
//! The artifact is read once at startup. Its format is picked from the file
//! extension: `.onnx` goes through tract, `.json` is a serialized
//! [`ModelArtifact`].

use super::{LinearModel, ModelHandle, OnnxModel, TreeEnsemble};
use crate::error::PricerError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// JSON model artifacts, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    pub fn into_handle(self) -> Result<ModelHandle, PricerError> {
        match self {
            ModelArtifact::Linear(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
            ModelArtifact::TreeEnsemble(model) => Ok(Arc::new(model)),
        }
    }
}

/// Load a model artifact from disk, optionally verifying its SHA256 checksum
pub fn load_model(path: &Path, expected_sha256: Option<&str>) -> Result<ModelHandle, PricerError> {
    let bytes = std::fs::read(path).map_err(|source| PricerError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let model = load_model_from_bytes(&bytes, &extension, expected_sha256)?;
    info!(
        path = %path.display(),
        kind = model.kind(),
        size_bytes = bytes.len(),
        "Model artifact loaded"
    );
    Ok(model)
}

/// Load a model from raw bytes in the given format (`json` or `onnx`)
pub fn load_model_from_bytes(
    bytes: &[u8],
    format: &str,
    expected_sha256: Option<&str>,
) -> Result<ModelHandle, PricerError> {
    if let Some(expected) = expected_sha256 {
        let actual = compute_checksum(bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(PricerError::Checksum {
                expected: expected.to_string(),
                actual,
            });
        }
        debug!(checksum = %actual, "Model checksum verified");
    }

    match format {
        "onnx" => Ok(Arc::new(OnnxModel::from_bytes(bytes)?)),
        "json" => serde_json::from_slice::<ModelArtifact>(bytes)?.into_handle(),
        other => Err(PricerError::UnsupportedFormat(other.to_string())),
    }
}

/// Compute SHA256 checksum of data
fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
