use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Vocabulary ids found so far, per page index.
///
/// Each page keeps its ids in the order they were found, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundState {
    pages: BTreeMap<usize, Vec<String>>,
}

impl FoundState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_found(&self, page: usize, entry_id: &str) -> bool {
        self.pages
            .get(&page)
            .is_some_and(|ids| ids.iter().any(|id| id == entry_id))
    }

    pub fn found_on(&self, page: usize) -> &[String] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total finds across all pages.
    pub fn len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record `entry_id` as found on `page`.
///
/// Returns the updated state and whether this was a new find. Recording a pair
/// that is already present returns an identical state and `false`; the input
/// is never modified.
pub fn record_found(page: usize, entry_id: &str, state: &FoundState) -> (FoundState, bool) {
    if state.is_found(page, entry_id) {
        return (state.clone(), false);
    }

    let mut next = state.clone();
    next.pages
        .entry(page)
        .or_default()
        .push(entry_id.to_string());
    (next, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_record_is_a_no_op() {
        let empty = FoundState::new();
        let (once, first) = record_found(2, "x", &empty);
        let (twice, second) = record_found(2, "x", &once);

        assert!(first);
        assert!(!second);
        assert_eq!(once, twice);
        assert_eq!(twice.found_on(2), ["x"]);
        assert!(empty.is_empty());
    }

    #[test]
    fn pages_are_independent() {
        let (state, _) = record_found(0, "x", &FoundState::new());
        let (state, new_on_other_page) = record_found(1, "x", &state);
        let (state, _) = record_found(1, "y", &state);

        assert!(new_on_other_page);
        assert!(state.is_found(0, "x"));
        assert!(!state.is_found(0, "y"));
        assert_eq!(state.found_on(1), ["x", "y"]);
        assert!(state.found_on(7).is_empty());
        assert_eq!(state.len(), 3);
    }
}
