// Rust guideline compliant 2026-10-16

//! Property-based tests for the listing helpers.

use libris_app::list::{clamp_or, filter_rows, matches_search, PARALLEL_THRESHOLD};
use proptest::prelude::*;

proptest! {
    /// Parallel and sequential filtering keep the same rows in the same order.
    #[test]
    fn prop_filter_preserves_order(extra in 0usize..500, modulus in 1u32..7) {
        let rows: Vec<u32> = (0..(PARALLEL_THRESHOLD + extra) as u32).collect();
        let expected: Vec<u32> = rows.iter().copied().filter(|v| v % modulus == 0).collect();
        let small: Vec<u32> = rows.iter().copied().take(10).filter(|v| v % modulus == 0).collect();

        prop_assert_eq!(filter_rows(rows.clone(), |v| v % modulus == 0), expected);
        let head: Vec<u32> = rows.into_iter().take(10).collect();
        prop_assert_eq!(filter_rows(head, |v| v % modulus == 0), small);
    }

    #[test]
    fn prop_clamp_stays_in_bounds(value in proptest::option::of(0u32..500), default in 0u32..100) {
        let clamped = clamp_or(value, default, 1, 100);
        prop_assert!((1..=100).contains(&clamped));
    }

    /// Any substring of a field matches, whatever its case.
    #[test]
    fn prop_search_is_case_insensitive(title in "[a-zA-Z ]{1,20}", start in 0usize..20, len in 1usize..20) {
        let start = start.min(title.len() - 1);
        let end = (start + len).min(title.len());
        let needle = title[start..end].to_uppercase();
        prop_assert!(matches_search(&needle, &[&title]));
    }
}

#[test]
fn test_empty_needle_matches_everything() {
    assert!(matches_search("  ", &["anything"]));
    assert!(!matches_search("dune", &["Emma", "Austen"]));
}
