//! Offline model inspection

use anyhow::{Context, Result};
use pricer_lib::model::{load_model, TrainedModel};
use pricer_lib::reconcile::{discover_schema, FeatureReconciler};
use pricer_lib::SchemaReport;
use std::path::Path;

use crate::commands::schema::print_schema;
use crate::output::OutputFormat;

/// Run schema discovery on a local artifact, without a server
pub fn inspect_model(path: &Path, sha256: Option<&str>) -> Result<SchemaReport> {
    let model = load_model(path, sha256)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    let reconciler = FeatureReconciler::new(discover_schema(model.as_ref()));

    Ok(SchemaReport::new(model.kind(), &reconciler))
}

pub fn inspect(path: &Path, sha256: Option<&str>, format: OutputFormat) -> Result<()> {
    let schema = inspect_model(path, sha256)?;
    print_schema(&schema, format)
}
