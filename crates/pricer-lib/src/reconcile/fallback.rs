//! Positional placement for inputs without a named slot

use crate::models::{FeatureVector, KnownInput};

/// Minimum vector length for positional placement to run at all
pub const MIN_POSITIONAL_LEN: usize = 3;

/// Outcome of positional placement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    pub placed: Vec<(KnownInput, usize)>,
    /// Inputs that found no empty slot. These never reach the model.
    pub dropped: Vec<KnownInput>,
}

/// Place each `(input, value)` pair, in the given order, into the first slot
/// that still holds 0.0 and is not in `claimed`.
///
/// Nothing is placed when the vector is shorter than [`MIN_POSITIONAL_LEN`].
pub fn place_unmatched(
    vector: &mut FeatureVector,
    claimed: &[bool],
    unmatched: &[(KnownInput, f64)],
) -> Placement {
    let mut placement = Placement::default();
    if unmatched.is_empty() || vector.len() < MIN_POSITIONAL_LEN {
        return placement;
    }

    let mut taken: Vec<bool> = (0..vector.len())
        .map(|slot| claimed.get(slot).copied().unwrap_or(false))
        .collect();

    for &(input, value) in unmatched {
        let empty = (0..vector.len()).find(|&slot| !taken[slot] && vector.get(slot) == Some(0.0));
        match empty {
            Some(slot) => {
                vector.set(slot, value);
                taken[slot] = true;
                placement.placed.push((input, slot));
            }
            None => placement.dropped.push(input),
        }
    }

    placement
}
