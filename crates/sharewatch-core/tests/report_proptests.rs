#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the report reducer.

use proptest::prelude::*;
use sharewatch_core::{
    assemble_report, combinations, ReconstructionOutcome, ReportStatus, SchemeParams,
    ValidityPolicy,
};

const SECRET: &str = "hello";

/// Deterministic stand-in for the oracle: any subset touching a corrupted
/// node yields either garbage or an error.
fn evaluate(
    n: usize,
    k: usize,
    corrupted: &[usize],
    garbage: bool,
) -> Vec<(Vec<usize>, ReconstructionOutcome)> {
    combinations(n, k)
        .map(|subset| {
            let outcome = if subset.iter().any(|i| corrupted.contains(i)) {
                if garbage {
                    ReconstructionOutcome::Decoded(format!("junk-{subset:?}"))
                } else {
                    ReconstructionOutcome::Failed {
                        reason: "decrypt failed".into(),
                    }
                }
            } else {
                ReconstructionOutcome::Decoded(SECRET.into())
            };
            (subset, outcome)
        })
        .collect()
}

/// `(n, k, j)` with `k < n` so at least one subset avoids node `j`.
fn single_corruption_strategy() -> impl Strategy<Value = (usize, usize, usize)> {
    (3_usize..=8).prop_flat_map(|n| (Just(n), 2..n, 0..n))
}

fn scheme_strategy() -> impl Strategy<Value = (usize, usize)> {
    (2_usize..=8).prop_flat_map(|n| (Just(n), 2..=n))
}

proptest! {
    /// No corruption: nothing suspect, every subset valid, status intact.
    #[test]
    fn clean_shares_are_intact((n, k) in scheme_strategy()) {
        let params = SchemeParams::new(n, k).unwrap();
        let report = assemble_report(
            params,
            &ReconstructionOutcome::Decoded(SECRET.into()),
            evaluate(n, k, &[], false),
            &ValidityPolicy::reference(SECRET),
        );
        prop_assert!(report.suspects.is_empty());
        prop_assert_eq!(report.valid_combination_count() as u64, params.combination_count());
        prop_assert_eq!(report.status, ReportStatus::Intact);
    }

    /// One corrupted node is the sole suspect and recovery avoids it.
    #[test]
    fn single_corrupted_node_is_found(
        (n, k, j) in single_corruption_strategy(),
        garbage in any::<bool>(),
    ) {
        let params = SchemeParams::new(n, k).unwrap();
        let report = assemble_report(
            params,
            &ReconstructionOutcome::Failed { reason: "bad".into() },
            evaluate(n, k, &[j], garbage),
            &ValidityPolicy::commitment_to(SECRET),
        );
        prop_assert_eq!(&report.suspects, &vec![j]);
        let recovery = report.recovery.as_ref().unwrap();
        prop_assert_eq!(recovery.secret.as_str(), SECRET);
        prop_assert!(!recovery.nodes.contains(&j));
        prop_assert_eq!(report.status, ReportStatus::Recovered);
    }

    /// Tallies always sum to C(n-1, k-1) per node.
    #[test]
    fn tallies_cover_every_participation(
        (n, k) in scheme_strategy(),
        mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let corrupted: Vec<usize> = (0..n).filter(|&i| mask[i]).collect();
        let params = SchemeParams::new(n, k).unwrap();
        let report = assemble_report(
            params,
            &ReconstructionOutcome::Decoded(SECRET.into()),
            evaluate(n, k, &corrupted, true),
            &ValidityPolicy::reference(SECRET),
        );
        for tally in &report.tallies {
            prop_assert_eq!(tally.participations(), params.participations_per_node());
        }
    }

    /// More than n-k corrupted nodes leave no clean subset.
    #[test]
    fn too_much_corruption_is_unrecoverable((n, k) in scheme_strategy()) {
        let corrupted: Vec<usize> = (0..=n - k).collect();
        let params = SchemeParams::new(n, k).unwrap();
        let report = assemble_report(
            params,
            &ReconstructionOutcome::Failed { reason: "bad".into() },
            evaluate(n, k, &corrupted, false),
            &ValidityPolicy::reference(SECRET),
        );
        prop_assert!(report.recovery.is_none());
        prop_assert_eq!(report.status, ReportStatus::Unrecoverable);
    }

    /// The same outcomes always reduce to the same report.
    #[test]
    fn reduction_is_idempotent(
        (n, k) in scheme_strategy(),
        mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let corrupted: Vec<usize> = (0..n).filter(|&i| mask[i]).collect();
        let params = SchemeParams::new(n, k).unwrap();
        let policy = ValidityPolicy::Plurality;
        let all = ReconstructionOutcome::Decoded(SECRET.into());
        let first = assemble_report(params, &all, evaluate(n, k, &corrupted, true), &policy);
        let second = assemble_report(params, &all, evaluate(n, k, &corrupted, true), &policy);
        prop_assert_eq!(first, second);
    }
}
