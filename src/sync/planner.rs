//! Worklist computation for incremental index updates
//!
//! Pure functions only: no I/O, no logging. The orchestrator feeds in the
//! latest known comic number and the set of numbers already in the index.

use std::collections::BTreeSet;

use crate::utils::MISSING_COMIC_ID;

/// Comic numbers that still have to be fetched and indexed.
///
/// Returns `[1, latest] \ existing \ {MISSING_COMIC_ID}` in ascending order.
/// IDs in `existing` outside of `[1, latest]` are ignored.
#[must_use]
pub fn plan(latest: u32, existing: &BTreeSet<u32>) -> Vec<u32> {
    (1..=latest)
        .filter(|num| *num != MISSING_COMIC_ID && !existing.contains(num))
        .collect()
}

/// Number of comics a complete index holds when `latest` is the newest one
#[must_use]
pub fn expected_count(latest: u32) -> usize {
    let missing = usize::from((1..=latest).contains(&MISSING_COMIC_ID));
    latest as usize - missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_plans_everything_but_404() {
        let worklist = plan(410, &BTreeSet::new());
        assert_eq!(worklist.len(), 409);
        assert_eq!(worklist.first(), Some(&1));
        assert_eq!(worklist.last(), Some(&410));
        assert!(!worklist.contains(&404));
    }

    #[test]
    fn zero_latest_plans_nothing() {
        assert!(plan(0, &BTreeSet::new()).is_empty());
        assert_eq!(expected_count(0), 0);
    }

    #[test]
    fn existing_ids_are_skipped() {
        let existing: BTreeSet<u32> = [1, 3, 5].into_iter().collect();
        assert_eq!(plan(6, &existing), vec![2, 4, 6]);
    }

    #[test]
    fn complete_index_plans_nothing() {
        let existing: BTreeSet<u32> = (1..=500).filter(|n| *n != 404).collect();
        assert!(plan(500, &existing).is_empty());
        assert_eq!(expected_count(500), existing.len());
    }

    #[test]
    fn ids_beyond_latest_are_ignored() {
        let existing: BTreeSet<u32> = [2, 99].into_iter().collect();
        assert_eq!(plan(3, &existing), vec![1, 3]);
    }
}
