#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! End-to-end verification runs against an in-memory oracle.

mod common;

use std::time::Duration;

use common::{make_shares, FakeOracle, Tampered};
use sharewatch_core::{
    CoreError, ReportStatus, ShareSet, ValidityPolicy, DECRYPTION_FAILED_MARKER, ERROR_MARKER,
};
use sharewatch_verifier::{Verifier, VerifierError};

const SECRET: &str = "hello";

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Genuine shares for `n` nodes with the listed nodes tampered.
fn shares_with_tampering(n: usize, tampered: &[usize]) -> (Vec<String>, ShareSet) {
    let genuine = make_shares(n);
    let current: Vec<String> = genuine
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if tampered.contains(&i) {
                format!("{s}-tampered")
            } else {
                s.clone()
            }
        })
        .collect();
    (genuine, ShareSet::new(current).unwrap())
}

fn verifier(oracle: FakeOracle) -> Verifier<FakeOracle> {
    Verifier::new(oracle).with_max_concurrency(4)
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn node_b_corruption_is_detected_and_bypassed() {
    let (genuine, shares) = shares_with_tampering(4, &[1]);
    let v = verifier(FakeOracle::new(SECRET).with_genuine(&genuine));

    let report = v
        .verify(&shares, 3, &ValidityPolicy::reference(SECRET))
        .await
        .unwrap();

    assert_eq!(report.combinations.len(), 4);
    assert_eq!(report.suspects, vec![1]);
    assert_eq!(report.recovered_secret(), Some(SECRET));
    assert_eq!(report.recovery.as_ref().unwrap().nodes, vec![0, 2, 3]);
    assert_eq!(report.all_shares.result, DECRYPTION_FAILED_MARKER);
    assert!(!report.all_shares.succeeded);
    assert_eq!(report.status, ReportStatus::Recovered);

    let failing: Vec<&Vec<usize>> = report
        .combinations
        .iter()
        .filter(|c| !c.valid)
        .map(|c| &c.nodes)
        .collect();
    assert_eq!(failing, [&vec![0, 1, 2], &vec![0, 1, 3], &vec![1, 2, 3]]);
    assert!(report
        .combinations
        .iter()
        .filter(|c| !c.valid)
        .all(|c| c.result == ERROR_MARKER && c.error.is_some()));
}

#[tokio::test]
async fn clean_shares_are_intact() {
    let (genuine, shares) = shares_with_tampering(5, &[]);
    let v = verifier(FakeOracle::new(SECRET).with_genuine(&genuine));

    let report = v
        .verify(&shares, 3, &ValidityPolicy::commitment_to(SECRET))
        .await
        .unwrap();

    assert_eq!(report.status, ReportStatus::Intact);
    assert!(report.suspects.is_empty());
    assert_eq!(report.valid_combination_count(), 10);
    assert!(report.all_shares.valid);
    assert_eq!(v.oracle().calls(), 11);
}

#[tokio::test]
async fn corruption_beyond_n_minus_k_is_unrecoverable() {
    let (genuine, shares) = shares_with_tampering(4, &[0, 2]);
    let v = verifier(FakeOracle::new(SECRET).with_genuine(&genuine));

    let report = v
        .verify(&shares, 3, &ValidityPolicy::reference(SECRET))
        .await
        .unwrap();

    assert_eq!(report.status, ReportStatus::Unrecoverable);
    assert!(report.recovery.is_none());
    assert_eq!(report.valid_combination_count(), 0);
}

#[tokio::test]
async fn garbage_output_is_not_a_success() {
    let (genuine, shares) = shares_with_tampering(4, &[3]);
    let mut oracle = FakeOracle::new(SECRET).with_genuine(&genuine);
    oracle.tampered = Tampered::Garbage;
    let v = verifier(oracle);

    let report = v
        .verify(&shares, 2, &ValidityPolicy::reference(SECRET))
        .await
        .unwrap();

    assert_eq!(report.suspects, vec![3]);
    let with_three = report.combinations.iter().filter(|c| c.nodes.contains(&3));
    for combination in with_three {
        assert!(combination.result.starts_with("garbage:"));
        assert!(!combination.valid);
        assert!(combination.error.is_none());
    }
    assert!(report.all_shares.succeeded);
    assert!(!report.all_shares.valid);
}

#[tokio::test]
async fn plurality_finds_the_secret_without_side_information() {
    let (genuine, shares) = shares_with_tampering(5, &[0]);
    let mut oracle = FakeOracle::new(SECRET).with_genuine(&genuine);
    oracle.tampered = Tampered::Garbage;
    let v = verifier(oracle);

    let report = v
        .verify(&shares, 3, &ValidityPolicy::Plurality)
        .await
        .unwrap();

    assert_eq!(report.suspects, vec![0]);
    assert_eq!(report.recovered_secret(), Some(SECRET));
    assert_eq!(report.recovery.unwrap().nodes, vec![1, 2, 3]);
}

#[tokio::test]
async fn published_commitment_validates_without_plaintext() {
    let (genuine, shares) = shares_with_tampering(4, &[2]);
    let v = verifier(FakeOracle::new(SECRET).with_genuine(&genuine));
    let policy =
        ValidityPolicy::from_commitment_hex(&ValidityPolicy::commitment_hex(SECRET)).unwrap();

    let report = v.verify(&shares, 3, &policy).await.unwrap();

    assert_eq!(report.suspects, vec![2]);
    assert_eq!(report.recovery.unwrap().nodes, vec![0, 1, 3]);
}

#[tokio::test]
async fn repeated_runs_produce_identical_reports() {
    let (genuine, shares) = shares_with_tampering(6, &[1, 4]);
    let v = Verifier::new(FakeOracle::new(SECRET).with_genuine(&genuine)).with_max_concurrency(3);
    let policy = ValidityPolicy::reference(SECRET);

    let first = v.verify(&shares, 3, &policy).await.unwrap();
    let second = v.verify(&shares, 3, &policy).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.suspects, vec![1, 4]);
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_threshold_fails_before_any_call() {
    let (genuine, shares) = shares_with_tampering(4, &[]);
    let v = verifier(FakeOracle::new(SECRET).with_genuine(&genuine));
    let policy = ValidityPolicy::reference(SECRET);

    let too_small = v.verify(&shares, 1, &policy).await.unwrap_err();
    assert!(matches!(
        too_small,
        VerifierError::Core(CoreError::ThresholdTooSmall { threshold: 1, .. })
    ));

    let too_large = v.verify(&shares, 5, &policy).await.unwrap_err();
    assert!(matches!(
        too_large,
        VerifierError::Core(CoreError::ThresholdExceedsNodes {
            threshold: 5,
            nodes: 4
        })
    ));

    assert_eq!(v.oracle().calls(), 0);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn in_flight_calls_never_exceed_the_limit() {
    let (genuine, shares) = shares_with_tampering(8, &[5]);
    let mut oracle = FakeOracle::new(SECRET).with_genuine(&genuine);
    oracle.delay = Duration::from_millis(50);
    let v = Verifier::new(oracle).with_max_concurrency(3);

    let report = v
        .verify(&shares, 4, &ValidityPolicy::reference(SECRET))
        .await
        .unwrap();

    assert_eq!(v.oracle().calls(), 71);
    assert_eq!(v.oracle().peak(), 3);
    assert_eq!(report.suspects, vec![5]);
}

#[tokio::test(start_paused = true)]
async fn recovery_ignores_completion_order() {
    let (genuine, shares) = shares_with_tampering(5, &[]);
    let mut oracle = FakeOracle::new(SECRET).with_genuine(&genuine);
    // Every subset with node 0 finishes last.
    oracle.slow_on = Some(genuine[0].clone());
    let v = verifier(oracle);

    let report = v
        .verify(&shares, 3, &ValidityPolicy::reference(SECRET))
        .await
        .unwrap();

    assert_eq!(report.status, ReportStatus::Intact);
    assert_eq!(report.recovery.unwrap().nodes, vec![0, 1, 2]);
    let order: Vec<&Vec<usize>> = report.combinations.iter().map(|c| &c.nodes).collect();
    assert_eq!(order.first(), Some(&&vec![0, 1, 2]));
    assert_eq!(order.last(), Some(&&vec![2, 3, 4]));
}

#[tokio::test(start_paused = true)]
async fn hanging_calls_time_out_into_failures() {
    let (genuine, shares) = shares_with_tampering(4, &[]);
    let mut oracle = FakeOracle::new(SECRET).with_genuine(&genuine);
    oracle.hang_on = Some(genuine[2].clone());
    let v = verifier(oracle).with_call_timeout(Duration::from_secs(1));

    let report = v
        .verify(&shares, 3, &ValidityPolicy::reference(SECRET))
        .await
        .unwrap();

    assert_eq!(report.suspects, vec![2]);
    assert_eq!(report.recovery.unwrap().nodes, vec![0, 1, 3]);
    let timed_out = report
        .combinations
        .iter()
        .filter(|c| c.error.as_deref().is_some_and(|e| e.contains("timed out")))
        .count();
    assert_eq!(timed_out, 3);
    assert!(report.all_shares.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn panicking_call_becomes_a_failure() {
    let (genuine, shares) = shares_with_tampering(4, &[]);
    let mut oracle = FakeOracle::new(SECRET).with_genuine(&genuine);
    oracle.panic_on = Some(genuine[0].clone());
    let v = verifier(oracle);

    let report = v
        .verify(&shares, 3, &ValidityPolicy::reference(SECRET))
        .await
        .unwrap();

    assert_eq!(report.suspects, vec![0]);
    assert_eq!(report.recovery.unwrap().nodes, vec![1, 2, 3]);
    assert!(report
        .combinations
        .iter()
        .filter(|c| c.nodes.contains(&0))
        .all(|c| c.error.as_deref() == Some("reconstruction task aborted")));
}
