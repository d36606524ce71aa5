//! Bounded-concurrency verification run.
//!
//! One task per K-subset plus one for the all-shares attempt, gated by a
//! semaphore. Each call is wrapped in a timeout. Outcomes land in a slot
//! vector indexed by submission order and are reduced once, after every
//! task has finished, by [`assemble_report`].

use std::sync::Arc;
use std::time::Duration;

use sharewatch_core::{
    assemble_report, combinations, ReconstructionOutcome, SchemeParams, ShareSet,
    ValidityPolicy, VerificationReport,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::VerifierConfig;
use crate::error::VerifierError;
use crate::oracle::{OracleError, ReconstructionOracle};

/// Default number of oracle calls in flight.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default per-call time limit.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs verification passes against a reconstruction oracle.
#[derive(Debug)]
pub struct Verifier<O> {
    oracle: Arc<O>,
    max_concurrency: usize,
    call_timeout: Duration,
}

impl<O> Clone for Verifier<O> {
    fn clone(&self) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            max_concurrency: self.max_concurrency,
            call_timeout: self.call_timeout,
        }
    }
}

impl<O: ReconstructionOracle + 'static> Verifier<O> {
    /// Verifier with default concurrency and timeout.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle: Arc::new(oracle),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Verifier using the limits from `config`.
    pub fn from_config(oracle: O, config: &VerifierConfig) -> Self {
        Self::new(oracle)
            .with_max_concurrency(config.max_concurrency)
            .with_call_timeout(config.call_timeout())
    }

    /// Set the number of concurrent oracle calls (at least 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Set the per-call time limit.
    #[must_use]
    pub const fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// The wrapped oracle.
    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Concurrency limit.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Per-call time limit.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Reconstruct from every K-subset of `shares` and report which
    /// nodes are suspect.
    ///
    /// Suspect attribution is sound while at most `N - K` shares are
    /// corrupted; beyond that the report is `Unrecoverable`.
    ///
    /// # Errors
    ///
    /// Only precondition violations, before any oracle call:
    /// [`VerifierError::Core`] when `threshold` is out of range for the
    /// share count. Oracle failures are recorded in the report.
    pub async fn verify(
        &self,
        shares: &ShareSet,
        threshold: usize,
        policy: &ValidityPolicy,
    ) -> Result<VerificationReport, VerifierError> {
        let params = SchemeParams::new(shares.len(), threshold)?;
        let subsets: Vec<Vec<usize>> = combinations(params.nodes(), params.threshold()).collect();

        // Slot 0 is the all-shares attempt; slot i + 1 is subsets[i].
        let all_nodes: Vec<usize> = (0..params.nodes()).collect();
        let inputs = std::iter::once(&all_nodes)
            .chain(&subsets)
            .map(|indices| shares.select(indices))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            nodes = params.nodes(),
            threshold = params.threshold(),
            combinations = subsets.len(),
            mode = %policy.mode(),
            max_concurrency = self.max_concurrency,
            "Starting verification"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        for (slot, selected) in inputs.into_iter().enumerate() {
            let oracle = Arc::clone(&self.oracle);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.call_timeout;
            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => call_oracle(oracle.as_ref(), selected, params, timeout).await,
                    Err(_) => ReconstructionOutcome::Failed {
                        reason: "concurrency limiter closed".into(),
                    },
                };
                (slot, outcome)
            });
        }

        let mut slots: Vec<Option<ReconstructionOutcome>> =
            vec![None; subsets.len().saturating_add(1)];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => {
                    debug!(slot, decoded = outcome.decoded().is_some(), "Oracle call finished");
                    if let Some(entry) = slots.get_mut(slot) {
                        *entry = Some(outcome);
                    }
                }
                Err(e) => warn!(error = %e, "Reconstruction task did not complete"),
            }
        }

        let mut resolved = slots.into_iter().map(|s| s.unwrap_or_else(aborted));
        let all_shares = resolved.next().unwrap_or_else(aborted);
        let evaluated: Vec<(Vec<usize>, ReconstructionOutcome)> =
            subsets.into_iter().zip(resolved).collect();

        let report = assemble_report(params, &all_shares, evaluated, policy);
        info!(
            status = report.status.as_str(),
            suspects = ?report.suspects,
            valid_combinations = report.valid_combination_count(),
            recovered = report.recovery.is_some(),
            "Verification finished"
        );
        Ok(report)
    }
}

fn aborted() -> ReconstructionOutcome {
    ReconstructionOutcome::Failed {
        reason: "reconstruction task aborted".into(),
    }
}

async fn call_oracle<O: ReconstructionOracle>(
    oracle: &O,
    shares: Vec<String>,
    params: SchemeParams,
    timeout: Duration,
) -> ReconstructionOutcome {
    let result = tokio::time::timeout(timeout, oracle.reconstruct(shares, params))
        .await
        .unwrap_or_else(|_| {
            Err(OracleError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ))
        });
    match result {
        Ok(value) => ReconstructionOutcome::Decoded(value),
        Err(e) => ReconstructionOutcome::Failed {
            reason: e.to_string(),
        },
    }
}
