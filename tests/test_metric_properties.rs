/// Property-based tests for the metric engine
///
/// Verifies invariants that must always hold regardless of input shape.
use proptest::prelude::*;

use asmstats::metrics::{c90, c95, covered_fraction, lowest_window_identity, n50};

/// Property: breadth of coverage stays within [0, 1] for any interval set,
/// including overlapping and triple-copy-spanning intervals.
#[test]
fn prop_breadth_is_bounded() {
    proptest!(|(
        true_len in 1u64..2_000,
        raw in prop::collection::vec((0u64..6_000, 0u64..6_000), 0..20)
    )| {
        let intervals: Vec<(u64, u64)> = raw
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect();

        let breadth = covered_fraction(&intervals, true_len);
        prop_assert!((0.0..=1.0).contains(&breadth),
            "breadth out of range: {breadth}");
    });
}

/// Property: an interval shifted by one virtual copy covers exactly the
/// same folded bases as the unshifted one.
#[test]
fn prop_shifted_copy_covers_the_same_bases() {
    proptest!(|(
        true_len in 1u64..1_500,
        raw in prop::collection::vec((0u64..1_500, 1u64..400), 1..10)
    )| {
        let base: Vec<(u64, u64)> = raw
            .iter()
            .map(|&(start, len)| (start, start + len))
            .collect();
        let shifted: Vec<(u64, u64)> = base
            .iter()
            .map(|&(start, end)| (start + true_len, end + true_len))
            .collect();

        prop_assert_eq!(
            covered_fraction(&base, true_len),
            covered_fraction(&shifted, true_len)
        );
    });
}

/// Property: C90 <= C95 <= number of contigs.
#[test]
fn prop_c90_c95_ordering() {
    proptest!(|(
        lengths in prop::collection::vec(1u64..100_000, 1..50),
        ref_len in 1u64..10_000_000
    )| {
        let at_90 = c90(&lengths, ref_len);
        let at_95 = c95(&lengths, ref_len);

        prop_assert!(at_90 <= at_95, "c90 {at_90} > c95 {at_95}");
        prop_assert!(at_95 <= lengths.len());
    });
}

/// Property: N50 does not depend on input order.
#[test]
fn prop_n50_is_order_invariant() {
    proptest!(|(lengths in prop::collection::vec(1u64..100_000, 0..50))| {
        let mut reversed = lengths.clone();
        reversed.reverse();
        let mut ascending = lengths.clone();
        ascending.sort_unstable();

        prop_assert_eq!(n50(&lengths), n50(&reversed));
        prop_assert_eq!(n50(&lengths), n50(&ascending));
    });
}

/// Property: the window scan always yields a finite fraction in [0, 1],
/// never an unbounded or undefined value.
#[test]
fn prop_lowest_window_identity_is_finite() {
    proptest!(|(
        ops in prop::collection::vec(
            (1usize..50, prop::sample::select(vec!['=', 'X', 'I', 'D'])),
            0..20
        ),
        window in 1usize..100
    )| {
        let cigar: String = ops
            .iter()
            .map(|(count, op)| format!("{count}{op}"))
            .collect();

        let lowest = lowest_window_identity(&cigar, window);
        prop_assert!(lowest.is_finite());
        prop_assert!((0.0..=1.0).contains(&lowest));
    });
}
