//! Name-based slot lookup

/// Find the slot for `candidate` in `names`.
///
/// Exact case-insensitive matches are tried first, then substring matches;
/// each pass returns the lowest matching index. Unnamed entries never match.
pub fn find_index(candidate: &str, names: &[Option<String>]) -> Option<usize> {
    let needle = candidate.to_lowercase();
    let lowered: Vec<Option<String>> = names
        .iter()
        .map(|n| n.as_deref().map(str::to_lowercase))
        .collect();

    lowered
        .iter()
        .position(|n| n.as_deref() == Some(needle.as_str()))
        .or_else(|| {
            lowered
                .iter()
                .position(|n| n.as_deref().is_some_and(|n| n.contains(&needle)))
        })
}
