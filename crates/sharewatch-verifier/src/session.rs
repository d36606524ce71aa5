//! Share-set session: split a secret, tamper with shares, analyze.
//!
//! Mirrors the interactive demo lifecycle. Every mutation of the current
//! shares discards the last report, so a report always describes the
//! shares as they are now.

use rand::Rng;
use sharewatch_core::{
    corrupt_share, CoreError, SchemeParams, ShareSet, ValidityMode, ValidityPolicy,
    VerificationReport,
};
use tracing::info;

use crate::error::VerifierError;
use crate::oracle::{ReconstructionOracle, SharingOracle};
use crate::verifier::Verifier;

#[derive(Debug)]
struct StoredShares {
    original: ShareSet,
    current: ShareSet,
    policy: ValidityPolicy,
}

/// One secret's shares and the latest analysis of them.
#[derive(Debug)]
pub struct SharingSession<O> {
    verifier: Verifier<O>,
    params: SchemeParams,
    mode: ValidityMode,
    stored: Option<StoredShares>,
    report: Option<VerificationReport>,
}

impl<O> SharingSession<O>
where
    O: ReconstructionOracle + SharingOracle + 'static,
{
    /// Empty session. `mode` decides the policy derived on [`Self::store`].
    pub fn new(verifier: Verifier<O>, params: SchemeParams, mode: ValidityMode) -> Self {
        Self {
            verifier,
            params,
            mode,
            stored: None,
            report: None,
        }
    }

    /// Split `secret` through the oracle and keep the shares.
    ///
    /// Any previously stored shares and report are dropped first.
    ///
    /// # Errors
    ///
    /// - [`VerifierError::EmptySecret`] if `secret` is blank
    /// - [`VerifierError::Oracle`] if the split call fails
    /// - [`VerifierError::ShareCountMismatch`] if the oracle returns the
    ///   wrong number of shares
    /// - [`VerifierError::Core`] if a returned share is blank
    pub async fn store(&mut self, secret: &str) -> Result<&ShareSet, VerifierError> {
        self.reset();
        if secret.trim().is_empty() {
            return Err(VerifierError::EmptySecret);
        }

        let shares = self.verifier.oracle().split(secret, self.params).await?;
        if shares.len() != self.params.nodes() {
            return Err(VerifierError::ShareCountMismatch {
                expected: self.params.nodes(),
                actual: shares.len(),
            });
        }
        let shares = ShareSet::new(shares)?;

        let policy = match self.mode {
            ValidityMode::Reference => ValidityPolicy::reference(secret),
            ValidityMode::Commitment => ValidityPolicy::commitment_to(secret),
            ValidityMode::Plurality => ValidityPolicy::Plurality,
        };
        info!(
            nodes = self.params.nodes(),
            threshold = self.params.threshold(),
            mode = %self.mode,
            "Secret split into shares"
        );

        let stored = self.stored.insert(StoredShares {
            original: shares.clone(),
            current: shares,
            policy,
        });
        Ok(&stored.current)
    }

    /// Replace the current share of node `index`.
    ///
    /// # Errors
    ///
    /// [`VerifierError::NotStored`], or [`VerifierError::Core`] for a bad
    /// index or blank value.
    pub fn edit_share(&mut self, index: usize, value: String) -> Result<(), VerifierError> {
        let stored = self.stored.as_mut().ok_or(VerifierError::NotStored)?;
        stored.current.replace(index, value)?;
        self.report = None;
        Ok(())
    }

    /// Overwrite one character of node `index`'s share with a random
    /// different base64 character.
    ///
    /// Returns `false` (and changes nothing) when the share is too short
    /// to corrupt.
    ///
    /// # Errors
    ///
    /// [`VerifierError::NotStored`], or [`VerifierError::Core`] for an
    /// index past the last node.
    pub fn corrupt_share<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        rng: &mut R,
    ) -> Result<bool, VerifierError> {
        let stored = self.stored.as_mut().ok_or(VerifierError::NotStored)?;
        let share = stored.current.get(index).ok_or(CoreError::NodeOutOfRange {
            index,
            nodes: stored.current.len(),
        })?;
        let Some(corrupted) = corrupt_share(share, rng) else {
            return Ok(false);
        };
        stored.current.replace(index, corrupted)?;
        self.report = None;
        info!(node = index, "Share corrupted");
        Ok(true)
    }

    /// Put the shares back to what the oracle returned.
    ///
    /// # Errors
    ///
    /// [`VerifierError::NotStored`].
    pub fn restore_original(&mut self) -> Result<(), VerifierError> {
        let stored = self.stored.as_mut().ok_or(VerifierError::NotStored)?;
        stored.current = stored.original.clone();
        self.report = None;
        Ok(())
    }

    /// Verify the current shares and keep the report.
    ///
    /// # Errors
    ///
    /// [`VerifierError::NotStored`], or any precondition error from
    /// [`Verifier::verify`].
    pub async fn analyze(&mut self) -> Result<&VerificationReport, VerifierError> {
        self.report = None;
        let stored = self.stored.as_ref().ok_or(VerifierError::NotStored)?;
        let report = self
            .verifier
            .verify(&stored.current, self.params.threshold(), &stored.policy)
            .await?;
        Ok(&*self.report.insert(report))
    }

    /// Forget shares, policy and report.
    pub fn reset(&mut self) {
        self.stored = None;
        self.report = None;
    }

    /// Whether a secret has been stored.
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        self.stored.is_some()
    }

    /// Shares as currently (possibly) tampered with.
    #[must_use]
    pub fn current_shares(&self) -> Option<&ShareSet> {
        self.stored.as_ref().map(|s| &s.current)
    }

    /// Shares as returned by the oracle.
    #[must_use]
    pub fn original_shares(&self) -> Option<&ShareSet> {
        self.stored.as_ref().map(|s| &s.original)
    }

    /// Latest report, if the shares have not changed since.
    #[must_use]
    pub const fn report(&self) -> Option<&VerificationReport> {
        self.report.as_ref()
    }

    /// The verifier used by [`Self::analyze`].
    #[must_use]
    pub const fn verifier(&self) -> &Verifier<O> {
        &self.verifier
    }

    /// Scheme parameters.
    #[must_use]
    pub const fn params(&self) -> SchemeParams {
        self.params
    }

    /// Validity mode used on store.
    #[must_use]
    pub const fn mode(&self) -> ValidityMode {
        self.mode
    }
}
