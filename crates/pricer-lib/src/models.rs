//! Core data models for the price predictor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Accepted model years
pub const YEAR_RANGE: RangeInclusive<i32> = 1980..=2025;
pub const DEFAULT_YEAR: i32 = 2018;

/// Accepted odometer readings
pub const MILEAGE_RANGE: RangeInclusive<u32> = 0..=1_000_000;
pub const DEFAULT_MILEAGE: u32 = 45_000;

/// Accepted engine cylinder counts
pub const CYLINDERS_RANGE: RangeInclusive<u32> = 1..=16;
pub const DEFAULT_CYLINDERS: u32 = 4;

/// The three semantic inputs every form submission carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownInput {
    Year,
    Mileage,
    Cylinders,
}

impl KnownInput {
    /// Fixed order used by mapping and positional fallback
    pub const ALL: [KnownInput; 3] = [KnownInput::Year, KnownInput::Mileage, KnownInput::Cylinders];

    pub fn name(&self) -> &'static str {
        match self {
            KnownInput::Year => "year",
            KnownInput::Mileage => "mileage",
            KnownInput::Cylinders => "cylinders",
        }
    }

    /// True if `key` names one of the known inputs (case-insensitive)
    pub fn is_known_name(key: &str) -> bool {
        Self::ALL.iter().any(|k| k.name().eq_ignore_ascii_case(key))
    }
}

/// Values collected from one form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInputs {
    pub year: i32,
    pub mileage: u32,
    pub cylinders: u32,
    /// Categorical choices keyed by group prefix, valued by the chosen feature name
    #[serde(default)]
    pub selections: BTreeMap<String, String>,
}

impl Default for UserInputs {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR,
            mileage: DEFAULT_MILEAGE,
            cylinders: DEFAULT_CYLINDERS,
            selections: BTreeMap::new(),
        }
    }
}

impl UserInputs {
    pub fn new(year: i32, mileage: u32, cylinders: u32) -> Self {
        Self {
            year,
            mileage,
            cylinders,
            selections: BTreeMap::new(),
        }
    }

    pub fn with_selection(mut self, group: impl Into<String>, feature: impl Into<String>) -> Self {
        self.selections.insert(group.into(), feature.into());
        self
    }

    /// Clamp every numeric input into its accepted range
    pub fn clamped(mut self) -> Self {
        self.year = self.year.clamp(*YEAR_RANGE.start(), *YEAR_RANGE.end());
        self.mileage = self.mileage.clamp(*MILEAGE_RANGE.start(), *MILEAGE_RANGE.end());
        self.cylinders = self
            .cylinders
            .clamp(*CYLINDERS_RANGE.start(), *CYLINDERS_RANGE.end());
        self
    }

    pub fn value_of(&self, input: KnownInput) -> f64 {
        match input {
            KnownInput::Year => self.year as f64,
            KnownInput::Mileage => self.mileage as f64,
            KnownInput::Cylinders => self.cylinders as f64,
        }
    }
}

/// Inputs as received over the wire, before range checks.
///
/// Numbers are taken as `f64` so negative or fractional values reach
/// [`RawInputs::clamped`] instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub year: f64,
    pub mileage: f64,
    pub cylinders: f64,
    #[serde(default)]
    pub selections: BTreeMap<String, String>,
}

impl RawInputs {
    /// Round each number and clamp it into its accepted range
    pub fn clamped(self) -> UserInputs {
        UserInputs {
            year: clamp_year(self.year),
            mileage: clamp_mileage(self.mileage),
            cylinders: clamp_cylinders(self.cylinders),
            selections: self.selections,
        }
    }
}

fn clamp_round(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.round().clamp(min, max)
}

pub fn clamp_year(value: f64) -> i32 {
    clamp_round(value, *YEAR_RANGE.start() as f64, *YEAR_RANGE.end() as f64) as i32
}

pub fn clamp_mileage(value: f64) -> u32 {
    clamp_round(value, *MILEAGE_RANGE.start() as f64, *MILEAGE_RANGE.end() as f64) as u32
}

pub fn clamp_cylinders(value: f64) -> u32 {
    clamp_round(value, *CYLINDERS_RANGE.start() as f64, *CYLINDERS_RANGE.end() as f64) as u32
}

/// Fixed-length model input row
///
/// The length is set at allocation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<f64> {
        self.0.get(slot).copied()
    }

    /// Write `value` at `slot`; out-of-range slots are ignored
    pub fn set(&mut self, slot: usize, value: f64) -> bool {
        match self.0.get_mut(slot) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form() {
        let inputs = UserInputs::default();
        assert_eq!(inputs.year, 2018);
        assert_eq!(inputs.mileage, 45_000);
        assert_eq!(inputs.cylinders, 4);
        assert!(inputs.selections.is_empty());
    }

    #[test]
    fn test_clamped_respects_bounds() {
        let inputs = UserInputs::new(1900, 5_000_000, 0).clamped();
        assert_eq!(inputs.year, 1980);
        assert_eq!(inputs.mileage, 1_000_000);
        assert_eq!(inputs.cylinders, 1);

        let inputs = UserInputs::new(2030, 10, 40).clamped();
        assert_eq!(inputs.year, 2025);
        assert_eq!(inputs.mileage, 10);
        assert_eq!(inputs.cylinders, 16);
    }

    #[test]
    fn test_raw_inputs_accept_negative_and_fractional() {
        let raw: RawInputs = serde_json::from_str(
            r#"{"year": 2019.6, "mileage": -5, "cylinders": 99, "selections": {"color": "color_red"}}"#,
        )
        .unwrap();
        let inputs = raw.clamped();
        assert_eq!(inputs.year, 2020);
        assert_eq!(inputs.mileage, 0);
        assert_eq!(inputs.cylinders, 16);
        assert_eq!(inputs.selections["color"], "color_red");
    }

    #[test]
    fn test_known_input_names() {
        assert!(KnownInput::is_known_name("Year"));
        assert!(KnownInput::is_known_name("CYLINDERS"));
        assert!(!KnownInput::is_known_name("color"));
    }

    #[test]
    fn test_feature_vector_length_is_fixed() {
        let mut v = FeatureVector::zeros(3);
        assert!(v.set(2, 1.5));
        assert!(!v.set(3, 9.0));
        assert_eq!(v.len(), 3);
        assert_eq!(v.as_slice(), &[0.0, 0.0, 1.5]);
    }
}
