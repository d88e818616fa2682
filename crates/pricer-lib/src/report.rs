//! Prediction outcome formatting
//!
//! Converts a raw model output (or the error from the predict call) into the
//! text shown to the user.

use crate::models::KnownInput;
use crate::reconcile::{CountSource, FeatureReconciler, Reconciliation};
use serde::{Deserialize, Serialize};

/// Steps suggested whenever the predict call fails
pub const REMEDIATION_STEPS: [&str; 2] = [
    "Retrain the model and export the full pipeline (preprocessing and estimator together) \
     so it accepts the raw year, mileage and cylinders inputs.",
    "Inspect the model's feature names and align the input vector to them \
     (for example with `vpp inspect <model>`).",
];

/// Result of one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PriceOutcome {
    Success {
        price: f64,
        display: String,
        info: String,
        vector: Vec<f64>,
    },
    Failure {
        error: String,
        message: String,
        remediation: Vec<String>,
    },
}

impl PriceOutcome {
    pub fn success(price: f64, reconciliation: &Reconciliation, expected_count: usize) -> Self {
        PriceOutcome::Success {
            price,
            display: format!("Predicted Vehicle Price: {}", format_currency(price)),
            info: summary(reconciliation, expected_count),
            vector: reconciliation.vector.as_slice().to_vec(),
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        let error = error.to_string();
        PriceOutcome::Failure {
            message: format!("Prediction failed: {error}"),
            error,
            remediation: REMEDIATION_STEPS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PriceOutcome::Success { .. })
    }
}

/// A selectable categorical group and its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub key: String,
    pub options: Vec<String>,
}

/// What discovery learned about a model, as served by the schema endpoint
/// and printed by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub model_kind: String,
    pub expected_count: usize,
    pub count_known: bool,
    pub count_source: CountSource,
    pub feature_names: Vec<Option<String>>,
    /// Known inputs that map to a slot by name
    #[serde(default)]
    pub named_inputs: Vec<(KnownInput, usize)>,
    pub categorical_groups: Vec<GroupView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl SchemaReport {
    pub fn new(model_kind: &str, reconciler: &FeatureReconciler) -> Self {
        let schema = reconciler.schema();
        Self {
            model_kind: model_kind.to_string(),
            expected_count: schema.expected_count,
            count_known: schema.count_known(),
            count_source: schema.count_source,
            feature_names: schema.feature_names.clone(),
            named_inputs: KnownInput::ALL
                .iter()
                .filter_map(|&input| reconciler.named_slot(input).map(|slot| (input, slot)))
                .collect(),
            categorical_groups: reconciler
                .selectable_groups()
                .into_iter()
                .map(|g| GroupView {
                    key: g.key.clone(),
                    options: g.members.iter().map(|(name, _)| name.clone()).collect(),
                })
                .collect(),
            warning: schema.warning(),
        }
    }

    /// Known input written to `slot` by name, if any
    pub fn input_at(&self, slot: usize) -> Option<KnownInput> {
        self.named_inputs
            .iter()
            .find(|(_, s)| *s == slot)
            .map(|(input, _)| *input)
    }
}

fn summary(reconciliation: &Reconciliation, expected_count: usize) -> String {
    let mapping = if reconciliation.name_mapping_succeeded() {
        format!(
            "name-based mapping succeeded for {} of 3 inputs",
            reconciliation.mapped.len()
        )
    } else {
        "name-based mapping unavailable, inputs placed by position".to_string()
    };
    format!("Model expects {expected_count} features; {mapping}.")
}

/// Format an amount as dollars with thousands separators and two decimals.
///
/// Negative amounts keep the sign after the currency symbol (`$-1,234.50`),
/// including ones that round to zero (`$-0.00`). Non-finite values render as
/// `$nan`, `$inf` and `$-inf`.
pub fn format_currency(amount: f64) -> String {
    if amount.is_nan() {
        return "$nan".to_string();
    }
    if amount.is_infinite() {
        return if amount > 0.0 { "$inf" } else { "$-inf" }.to_string();
    }
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    format!("${sign}{grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureVector, KnownInput};

    fn reconciliation(mapped: usize) -> Reconciliation {
        Reconciliation {
            vector: FeatureVector::zeros(3),
            mapped: KnownInput::ALL.iter().take(mapped).enumerate().map(|(i, k)| (*k, i)).collect(),
            positional: Vec::new(),
            dropped: Vec::new(),
            selected_groups: Vec::new(),
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(18500.25), "$18,500.25");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-1234.5), "$-1,234.50");
        assert_eq!(format_currency(12.0), "$12.00");
    }

    #[test]
    fn test_format_currency_edge_values() {
        assert_eq!(format_currency(-0.001), "$-0.00");
        assert_eq!(format_currency(-0.0), "$-0.00");
        assert_eq!(format_currency(f64::NAN), "$nan");
        assert_eq!(format_currency(f64::INFINITY), "$inf");
        assert_eq!(format_currency(f64::NEG_INFINITY), "$-inf");
    }

    #[test]
    fn test_success_display() {
        let outcome = PriceOutcome::success(18500.25, &reconciliation(3), 3);
        match outcome {
            PriceOutcome::Success { display, info, .. } => {
                assert_eq!(display, "Predicted Vehicle Price: $18,500.25");
                assert!(info.contains("expects 3 features"));
                assert!(info.contains("succeeded for 3 of 3"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_info_without_names() {
        let outcome = PriceOutcome::success(1.0, &reconciliation(0), 5);
        let PriceOutcome::Success { info, .. } = outcome else {
            panic!("expected success");
        };
        assert!(info.contains("placed by position"));
    }

    #[test]
    fn test_failure_carries_error_and_remediation() {
        let outcome = PriceOutcome::failure("X has 3 features, but model expects 9");
        assert!(!outcome.is_success());
        let PriceOutcome::Failure { message, remediation, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(message, "Prediction failed: X has 3 features, but model expects 9");
        assert_eq!(remediation.len(), 2);
        assert!(remediation[0].contains("full pipeline"));
        assert!(remediation[1].contains("feature names"));
    }

    #[test]
    fn test_schema_report_names_inputs_by_substring() {
        use crate::reconcile::ModelSchema;

        let names = ["model_year", "total_mileage_km", "color_red", "color_blue"];
        let reconciler = FeatureReconciler::new(ModelSchema {
            feature_names: names.iter().map(|n| Some(n.to_string())).collect(),
            expected_count: 4,
            count_source: CountSource::ModelFeatureNames,
        });
        let report = SchemaReport::new("linear", &reconciler);

        assert_eq!(
            report.named_inputs,
            vec![(KnownInput::Year, 0), (KnownInput::Mileage, 1)]
        );
        assert_eq!(report.input_at(1), Some(KnownInput::Mileage));
        assert_eq!(report.input_at(2), None);
        assert_eq!(report.categorical_groups[0].options, vec!["color_red", "color_blue"]);
        assert!(report.warning.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["named_inputs"][0], serde_json::json!(["year", 0]));
    }

    #[test]
    fn test_outcome_json_is_tagged() {
        let json = serde_json::to_value(PriceOutcome::failure("boom")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["error"], "boom");
    }
}
