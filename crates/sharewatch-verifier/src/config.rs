//! Verifier configuration, stored as plain JSON.
//!
//! Every field has a serde default, so a partial file (or none at all)
//! still yields a usable configuration. `SHAREWATCH_*` environment
//! variables override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sharewatch_core::ValidityMode;

use crate::error::VerifierError;

/// Runtime settings for the oracle client and the verification fan-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifierConfig {
    /// Base URL of the blindfold oracle.
    #[serde(default = "default_oracle_base_url")]
    pub oracle_base_url: String,

    /// Path of the split endpoint, relative to the base URL.
    #[serde(default = "default_encrypt_path")]
    pub encrypt_path: String,

    /// Path of the reconstruct endpoint, relative to the base URL.
    #[serde(default = "default_decrypt_path")]
    pub decrypt_path: String,

    /// Oracle calls allowed in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-call time limit in milliseconds.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Validity policy used by sessions.
    #[serde(default)]
    pub validity: ValidityMode,

    /// Directory for the rolling log file; stderr only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            oracle_base_url: default_oracle_base_url(),
            encrypt_path: default_encrypt_path(),
            decrypt_path: default_decrypt_path(),
            max_concurrency: default_max_concurrency(),
            call_timeout_ms: default_call_timeout_ms(),
            validity: ValidityMode::default(),
            log_dir: None,
        }
    }
}

fn default_oracle_base_url() -> String {
    "http://localhost:3001".into()
}
fn default_encrypt_path() -> String {
    "/api/blindfold_encrypt".into()
}
fn default_decrypt_path() -> String {
    "/api/blindfold_decrypt".into()
}
const fn default_max_concurrency() -> usize {
    4
}
const fn default_call_timeout_ms() -> u64 {
    10_000
}

// ── Environment overrides ──────────────────────────────────────────

const ENV_ORACLE_URL: &str = "SHAREWATCH_ORACLE_URL";
const ENV_MAX_CONCURRENCY: &str = "SHAREWATCH_MAX_CONCURRENCY";
const ENV_CALL_TIMEOUT_MS: &str = "SHAREWATCH_CALL_TIMEOUT_MS";
const ENV_VALIDITY: &str = "SHAREWATCH_VALIDITY";
const ENV_LOG_DIR: &str = "SHAREWATCH_LOG_DIR";

impl VerifierConfig {
    /// Apply `SHAREWATCH_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Empty or unparsable values are
    /// ignored.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_ORACLE_URL) {
            self.oracle_base_url = url;
        }
        if let Some(n) = get(ENV_MAX_CONCURRENCY).and_then(|v| v.trim().parse().ok()) {
            self.max_concurrency = n;
        }
        if let Some(ms) = get(ENV_CALL_TIMEOUT_MS).and_then(|v| v.trim().parse().ok()) {
            self.call_timeout_ms = ms;
        }
        if let Some(mode) = get(ENV_VALIDITY).and_then(|v| v.parse().ok()) {
            self.validity = mode;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Reject settings the verifier cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Config`] for a zero concurrency limit, a
    /// zero timeout, or a base URL that is not `http(s)://`.
    pub fn validate(&self) -> Result<(), VerifierError> {
        if self.max_concurrency == 0 {
            return Err(VerifierError::Config("maxConcurrency must be at least 1".into()));
        }
        if self.call_timeout_ms == 0 {
            return Err(VerifierError::Config("callTimeoutMs must be at least 1".into()));
        }
        let url = self.oracle_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(VerifierError::Config(format!(
                "oracleBaseUrl must start with http:// or https://, got {url:?}"
            )));
        }
        Ok(())
    }

    /// Per-call time limit.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Full URL of the split endpoint.
    #[must_use]
    pub fn encrypt_url(&self) -> String {
        join_url(&self.oracle_base_url, &self.encrypt_path)
    }

    /// Full URL of the reconstruct endpoint.
    #[must_use]
    pub fn decrypt_url(&self) -> String {
        join_url(&self.oracle_base_url, &self.decrypt_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}

// ── File I/O ───────────────────────────────────────────────────────

impl VerifierConfig {
    /// Load configuration from `path`.
    ///
    /// Returns [`Default::default()`] when the file is missing or
    /// contains invalid JSON.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Config file is corrupt, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist configuration to `path`.
    ///
    /// Writes a sibling `.tmp` file and renames it over `path`.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the
    /// file system rejects the write/rename.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, path)?;

        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
