//! In-memory oracle shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use sharewatch_core::SchemeParams;
use sharewatch_verifier::{OracleError, ReconstructionOracle, SharingOracle};

/// What a subset containing a tampered share reconstructs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tampered {
    /// The oracle rejects the subset.
    Error,
    /// The oracle decodes garbage, distinct per subset.
    Garbage,
}

/// Deterministic oracle: a subset reconstructs the secret iff every share
/// in it is one this oracle handed out.
#[derive(Debug)]
pub struct FakeOracle {
    secret: String,
    genuine: Mutex<HashSet<String>>,
    pub tampered: Tampered,
    pub delay: Duration,
    /// Calls touching this share take an extra second.
    pub slow_on: Option<String>,
    /// Calls touching this share never return.
    pub hang_on: Option<String>,
    /// Calls touching this share panic.
    pub panic_on: Option<String>,
    /// Hand out one share fewer than asked for.
    pub short_split: bool,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeOracle {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_owned(),
            genuine: Mutex::new(HashSet::new()),
            tampered: Tampered::Error,
            delay: Duration::ZERO,
            slow_on: None,
            hang_on: None,
            panic_on: None,
            short_split: false,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Register `shares` as genuine without going through `split`.
    pub fn with_genuine(self, shares: &[String]) -> Self {
        self.genuine.lock().unwrap().extend(shares.iter().cloned());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// `n` distinct, base64-looking shares longer than the corruption offset.
pub fn make_shares(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("c2hhcmUt{i:02}QUJDREVGR0hJSktMTU5PUA==")).collect()
}

impl SharingOracle for FakeOracle {
    async fn split(&self, _secret: &str, params: SchemeParams) -> Result<Vec<String>, OracleError> {
        let count = if self.short_split {
            params.nodes() - 1
        } else {
            params.nodes()
        };
        let shares = make_shares(count);
        self.genuine.lock().unwrap().extend(shares.iter().cloned());
        Ok(shares)
    }
}

impl ReconstructionOracle for FakeOracle {
    async fn reconstruct(
        &self,
        shares: Vec<String>,
        params: SchemeParams,
    ) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(marker) = &self.slow_on {
            if shares.contains(marker) {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
        if let Some(marker) = &self.hang_on {
            if shares.contains(marker) {
                std::future::pending::<()>().await;
            }
        }
        if let Some(marker) = &self.panic_on {
            assert!(!shares.contains(marker), "oracle crashed");
        }

        let result = if shares.len() < params.threshold() {
            Err(OracleError::Status {
                status: 400,
                kind: None,
                message: "not enough shares".into(),
            })
        } else if shares.iter().all(|s| self.genuine.lock().unwrap().contains(s)) {
            Ok(self.secret.clone())
        } else {
            match self.tampered {
                Tampered::Error => Err(OracleError::Status {
                    status: 500,
                    kind: Some("ValueError".into()),
                    message: "decryption failed".into(),
                }),
                Tampered::Garbage => Ok(format!("garbage:{}", shares.concat())),
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
