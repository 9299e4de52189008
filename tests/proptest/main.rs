// Test code is allowed to panic on failure
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Property-based tests for quorum-operator.
//!
//! Uses proptest to generate random inputs and verify invariants.

use proptest::prelude::*;

use quorum_operator::quorum::quorum;
use quorum_operator::transition::state::normalize_exclusions;

proptest! {
    /// quorum(n) = n/2 + 1 for all n > 0, and 0 for n = 0.
    #[test]
    fn quorum_is_integer_majority(n in 0..10_000i32) {
        let q = quorum(n);
        if n == 0 {
            prop_assert_eq!(q, 0);
        } else {
            prop_assert_eq!(q, n / 2 + 1);
        }
    }

    /// Any quorum of a non-empty master set is a strict majority: two
    /// disjoint groups can never both reach it.
    #[test]
    fn quorum_prevents_disjoint_majorities(n in 1..10_000i32) {
        let q = quorum(n);
        prop_assert!(q * 2 > n);
        prop_assert!(q <= n);
    }

    /// Normalization is order-insensitive and idempotent.
    #[test]
    fn exclusion_normalization_is_canonical(
        mut names in proptest::collection::vec("[a-z]{1,8}-[0-9]{1,3}", 0..12)
    ) {
        let normalized = normalize_exclusions(&names);
        names.reverse();
        prop_assert_eq!(normalize_exclusions(&names), normalized.clone());

        // re-normalizing the parsed value reproduces it
        if !normalized.is_empty() {
            let parsed: Vec<String> = normalized.split(',').map(str::to_string).collect();
            prop_assert_eq!(normalize_exclusions(&parsed), normalized);
        }
    }
}
