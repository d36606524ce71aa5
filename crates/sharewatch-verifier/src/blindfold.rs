//! HTTP client for the blindfold oracle.
//!
//! Wire format (snake_case, JSON):
//!
//! - split: `{secret, cluster_size, threshold}` -> `{shares, runtime}`
//! - reconstruct: `{shares, cluster_size, threshold}` -> `{decrypted, runtime}`
//! - failure: 4xx/5xx with `{error, type}`
//!
//! Every response body is decoded into an explicit schema; anything that
//! does not fit is [`OracleError::MalformedResponse`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sharewatch_core::SchemeParams;

use crate::config::VerifierConfig;
use crate::error::VerifierError;
use crate::oracle::{OracleError, ReconstructionOracle, SharingOracle};

/// Longest slice of a non-JSON error body kept in [`OracleError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Wire schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EncryptRequest<'a> {
    secret: &'a str,
    cluster_size: usize,
    threshold: usize,
}

#[derive(Debug, Deserialize)]
struct EncryptResponse {
    shares: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DecryptRequest<'a> {
    shares: &'a [String],
    cluster_size: usize,
    threshold: usize,
}

#[derive(Debug, Deserialize)]
struct DecryptResponse {
    decrypted: DecryptedValue,
}

/// Secrets that look numeric may come back as JSON numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DecryptedValue {
    Text(String),
    Number(serde_json::Number),
}

impl DecryptedValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blindfold oracle over HTTP. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BlindfoldClient {
    http: reqwest::Client,
    encrypt_url: String,
    decrypt_url: String,
}

impl BlindfoldClient {
    /// Client for the endpoints named in `config`.
    ///
    /// The per-call timeout is also applied at the HTTP layer so that
    /// split calls, which run outside the verifier, are bounded too.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Config`] if the configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, VerifierError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.call_timeout())
            .build()
            .map_err(|e| VerifierError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            encrypt_url: config.encrypt_url(),
            decrypt_url: config.decrypt_url(),
        })
    }

    /// Split endpoint URL.
    #[must_use]
    pub fn encrypt_url(&self) -> &str {
        &self.encrypt_url
    }

    /// Reconstruct endpoint URL.
    #[must_use]
    pub fn decrypt_url(&self) -> &str {
        &self.decrypt_url
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, OracleError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !status.is_success() {
            let (kind, message) = match serde_json::from_slice::<ErrorBody>(&bytes) {
                Ok(body) => (body.kind, body.error),
                Err(_) => (
                    None,
                    String::from_utf8_lossy(&bytes)
                        .chars()
                        .take(MAX_ERROR_BODY_CHARS)
                        .collect(),
                ),
            };
            return Err(OracleError::Status {
                status: status.as_u16(),
                kind,
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| OracleError::MalformedResponse(e.to_string()))
    }
}

impl SharingOracle for BlindfoldClient {
    async fn split(&self, secret: &str, params: SchemeParams) -> Result<Vec<String>, OracleError> {
        let request = EncryptRequest {
            secret,
            cluster_size: params.nodes(),
            threshold: params.threshold(),
        };
        let response: EncryptResponse = self.post(&self.encrypt_url, &request).await?;
        tracing::debug!(shares = response.shares.len(), "Split response received");
        Ok(response.shares)
    }
}

impl ReconstructionOracle for BlindfoldClient {
    async fn reconstruct(
        &self,
        shares: Vec<String>,
        params: SchemeParams,
    ) -> Result<String, OracleError> {
        let request = DecryptRequest {
            shares: &shares,
            cluster_size: params.nodes(),
            threshold: params.threshold(),
        };
        let response: DecryptResponse = self.post(&self.decrypt_url, &request).await?;
        Ok(response.decrypted.into_string())
    }
}
