//! One-hot categorical groups recovered from feature-name prefixes

use crate::models::{FeatureVector, KnownInput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of groups offered on the form
pub const MAX_SELECTABLE_GROUPS: usize = 6;

/// Prefixes produced by anonymous column naming; such groups carry no meaning
const PLACEHOLDER_PREFIXES: &[&str] = &[
    "", "x", "f", "feat", "feature", "col", "column", "var", "unnamed",
];

/// A family of one-hot slots sharing a name prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalGroup {
    pub key: String,
    /// `(feature name, slot index)` in ascending slot order
    pub members: Vec<(String, usize)>,
}

impl CategoricalGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn slot_of(&self, feature: &str) -> Option<usize> {
        self.members
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, slot)| *slot)
    }

    /// Display label for a member: the part after the group prefix
    pub fn label_of<'a>(&self, feature: &'a str) -> &'a str {
        feature
            .split_once('_')
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
            .unwrap_or(feature)
    }

    /// Set `feature`'s slot to 1.0 and the rest of the group to 0.0.
    ///
    /// Slots marked in `claimed` are never written. Returns false, leaving the
    /// vector untouched, when `feature` is not a member or its slot is claimed.
    pub fn select(&self, feature: &str, vector: &mut FeatureVector, claimed: &[bool]) -> bool {
        let is_claimed = |slot: usize| claimed.get(slot).copied().unwrap_or(false);
        let Some(chosen) = self.slot_of(feature).filter(|&slot| !is_claimed(slot)) else {
            return false;
        };
        for (_, slot) in &self.members {
            if !is_claimed(*slot) {
                vector.set(*slot, if *slot == chosen { 1.0 } else { 0.0 });
            }
        }
        true
    }
}

fn is_placeholder(key: &str) -> bool {
    PLACEHOLDER_PREFIXES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(key))
}

/// Group names containing an underscore by the text before the first one.
///
/// Groups come back in order of first appearance.
pub fn discover_groups(names: &[Option<String>]) -> Vec<CategoricalGroup> {
    let mut groups: Vec<CategoricalGroup> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (slot, name) in names.iter().enumerate() {
        let Some(name) = name else { continue };
        let Some((key, _)) = name.split_once('_') else {
            continue;
        };
        if is_placeholder(key) {
            continue;
        }
        let pos = *by_key.entry(key.to_string()).or_insert_with(|| {
            groups.push(CategoricalGroup {
                key: key.to_string(),
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[pos].members.push((name.clone(), slot));
    }

    groups
}

/// Groups offered on the form: largest first, at most six, never one keyed by
/// a known numeric input.
pub fn selectable_groups(groups: &[CategoricalGroup]) -> Vec<&CategoricalGroup> {
    let mut candidates: Vec<&CategoricalGroup> = groups
        .iter()
        .filter(|g| !KnownInput::is_known_name(&g.key))
        .collect();
    // Stable sort keeps first-appearance order among equal sizes.
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));
    candidates.truncate(MAX_SELECTABLE_GROUPS);
    candidates
}
