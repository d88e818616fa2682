//! Feature-vector reconciliation
//!
//! Turns form inputs into a vector the loaded model accepts, using whatever
//! schema information discovery recovered:
//! - named slots for year, mileage and cylinders
//! - one-hot categorical groups from feature-name prefixes
//! - positional placement for anything left over

mod categorical;
mod discovery;
mod fallback;
mod mapping;

pub use categorical::{discover_groups, selectable_groups, CategoricalGroup, MAX_SELECTABLE_GROUPS};
pub use discovery::{discover_schema, CountSource, ModelSchema, MIN_FEATURE_COUNT};
pub use fallback::{place_unmatched, Placement, MIN_POSITIONAL_LEN};
pub use mapping::find_index;

use crate::models::{FeatureVector, KnownInput, UserInputs};
use serde::Serialize;
use tracing::debug;

/// The vector built for one request plus how each input got there
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub vector: FeatureVector,
    /// Inputs written to a slot located by name
    pub mapped: Vec<(KnownInput, usize)>,
    /// Inputs written to an empty slot by position
    pub positional: Vec<(KnownInput, usize)>,
    /// Inputs with no slot left; they are not sent to the model
    pub dropped: Vec<KnownInput>,
    /// Group keys whose selection was applied
    pub selected_groups: Vec<String>,
}

impl Reconciliation {
    /// True when at least one known input was located by feature name
    pub fn name_mapping_succeeded(&self) -> bool {
        !self.mapped.is_empty()
    }
}

/// Builds feature vectors against a fixed, discovered schema
#[derive(Debug, Clone)]
pub struct FeatureReconciler {
    schema: ModelSchema,
    groups: Vec<CategoricalGroup>,
}

impl FeatureReconciler {
    pub fn new(schema: ModelSchema) -> Self {
        let groups = discover_groups(&schema.feature_names);
        Self { schema, groups }
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn groups(&self) -> &[CategoricalGroup] {
        &self.groups
    }

    /// Groups exposed as selection controls
    pub fn selectable_groups(&self) -> Vec<&CategoricalGroup> {
        selectable_groups(&self.groups)
    }

    /// Slot located by name for `input`, if any
    pub fn named_slot(&self, input: KnownInput) -> Option<usize> {
        find_index(input.name(), &self.schema.feature_names)
            .filter(|&i| i < self.schema.expected_count)
    }

    /// Build a fresh vector for one request.
    ///
    /// Order matters: named slots first, then categorical selections, then
    /// positional placement into whatever is still empty.
    pub fn build_vector(&self, inputs: &UserInputs) -> Reconciliation {
        let len = self.schema.expected_count;
        let mut vector = FeatureVector::zeros(len);
        let mut claimed = vec![false; len];
        let mut mapped = Vec::new();
        let mut unmatched = Vec::new();

        for input in KnownInput::ALL {
            let value = inputs.value_of(input);
            match self.named_slot(input) {
                Some(slot) => {
                    vector.set(slot, value);
                    claimed[slot] = true;
                    mapped.push((input, slot));
                }
                None => unmatched.push((input, value)),
            }
        }

        let selectable = self.selectable_groups();
        let mut selected_groups = Vec::new();
        for (key, feature) in &inputs.selections {
            let Some(group) = selectable.iter().find(|g| &g.key == key) else {
                debug!(group = %key, "Ignoring selection for unknown group");
                continue;
            };
            if group.select(feature, &mut vector, &claimed) {
                for (_, slot) in &group.members {
                    if let Some(c) = claimed.get_mut(*slot) {
                        *c = true;
                    }
                }
                selected_groups.push(key.clone());
            }
        }

        let Placement { placed, dropped } = place_unmatched(&mut vector, &claimed, &unmatched);

        Reconciliation {
            vector,
            mapped,
            positional: placed,
            dropped,
            selected_groups,
        }
    }
}
