//! Credential-token (NUC) envelope decoding.
//!
//! An envelope is one or more tokens joined by `/`. The first token is the
//! one being presented; the rest are its proofs, nearest first. Each token
//! is `header.payload.signature`, every segment base64url (padding
//! optional).
//!
//! Decoding is structural only: signatures are surfaced as bytes, never
//! verified.

pub mod aliases;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

const TOKEN_SEPARATOR: char = '/';
const SEGMENT_SEPARATOR: char = '.';

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

/// Token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signature algorithm (e.g. `ES256K`).
    pub alg: String,
    /// Token type marker (`nuc` on newer tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
}

/// Token payload. Exactly one of `args` (invocation) or `pol`
/// (delegation) is present on a well-formed token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Issuer DID.
    pub iss: String,
    /// Audience DID.
    pub aud: String,
    /// Subject DID.
    pub sub: String,
    /// Command path (e.g. `/nil/db/data/find`).
    pub cmd: String,
    /// Invocation arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
    /// Delegation policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pol: Option<Vec<Value>>,
    /// Expiry timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Not-before timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    /// Issued-at timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Replay nonce.
    pub nonce: String,
    /// Hashes of the proofs this token builds on.
    #[serde(default)]
    pub prf: Vec<String>,
}

/// Invocation or delegation body of a payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenBody<'a> {
    /// `args`: the token invokes `cmd` with these arguments.
    Invocation(&'a Map<String, Value>),
    /// `pol`: the token delegates `cmd` under these policies.
    Delegation(&'a [Value]),
}

impl TokenPayload {
    /// The payload body, when exactly one of `args` / `pol` is set.
    #[must_use]
    pub fn body(&self) -> Option<TokenBody<'_>> {
        match (&self.args, &self.pol) {
            (Some(args), None) => Some(TokenBody::Invocation(args)),
            (None, Some(pol)) => Some(TokenBody::Delegation(pol)),
            _ => None,
        }
    }
}

/// A single decoded token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedToken {
    /// The token exactly as it appeared in the envelope.
    pub encoded: String,
    /// Decoded header.
    pub header: TokenHeader,
    /// Decoded payload.
    pub payload: TokenPayload,
    /// Raw signature bytes.
    #[serde(serialize_with = "serialize_hex")]
    pub signature: Vec<u8>,
}

impl DecodedToken {
    /// Signature as lowercase hex.
    #[must_use]
    pub fn signature_hex(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.signature)
    }
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&data_encoding::HEXLOWER.encode(bytes))
}

/// A presented token together with its proof chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEnvelope {
    /// The token being presented.
    pub token: DecodedToken,
    /// Proofs, nearest first.
    pub proofs: Vec<DecodedToken>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a `/`-separated envelope of base64url tokens.
///
/// # Errors
///
/// Returns [`CoreError::TokenDecode`] if the input is blank, a token does
/// not have three segments, a segment is not base64url, the header or
/// payload does not match its schema, or a payload carries neither (or
/// both) of `args` and `pol`.
pub fn decode_envelope(input: &str) -> Result<TokenEnvelope, CoreError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CoreError::TokenDecode("empty token".into()));
    }

    let mut tokens = input
        .split(TOKEN_SEPARATOR)
        .enumerate()
        .map(|(position, raw)| decode_token(position, raw));

    let token = tokens
        .next()
        .ok_or_else(|| CoreError::TokenDecode("empty token".into()))??;
    let proofs = tokens.collect::<Result<Vec<_>, _>>()?;

    Ok(TokenEnvelope { token, proofs })
}

fn decode_token(position: usize, raw: &str) -> Result<DecodedToken, CoreError> {
    let fail = |what: String| CoreError::TokenDecode(format!("token {position}: {what}"));

    let segments: Vec<&str> = raw.split(SEGMENT_SEPARATOR).collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(fail(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    let header_bytes = decode_segment(header).map_err(|e| fail(format!("header: {e}")))?;
    let payload_bytes = decode_segment(payload).map_err(|e| fail(format!("payload: {e}")))?;
    let signature = decode_segment(signature).map_err(|e| fail(format!("signature: {e}")))?;
    if signature.is_empty() {
        return Err(fail("signature is empty".into()));
    }

    let header: TokenHeader =
        serde_json::from_slice(&header_bytes).map_err(|e| fail(format!("header: {e}")))?;
    let payload: TokenPayload =
        serde_json::from_slice(&payload_bytes).map_err(|e| fail(format!("payload: {e}")))?;
    if payload.body().is_none() {
        return Err(fail("payload must carry exactly one of args or pol".into()));
    }

    Ok(DecodedToken {
        encoded: raw.to_owned(),
        header,
        payload,
        signature,
    })
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, data_encoding::DecodeError> {
    data_encoding::BASE64URL_NOPAD.decode(segment.trim_end_matches('=').as_bytes())
}

// ---------------------------------------------------------------------------
// Chain view
// ---------------------------------------------------------------------------

/// Position of a token in the displayed chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainItemKind {
    /// A proof the presented token builds on.
    Chained,
    /// The presented token.
    Active,
}

impl ChainItemKind {
    /// Uppercase identifier, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chained => "CHAINED",
            Self::Active => "ACTIVE",
        }
    }
}

/// One entry of the token chain view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainItem<'a> {
    /// Stable identifier (`chained_token_1`, .., `end_of_chain_token`).
    pub id: String,
    /// Chained proof or active token.
    pub kind: ChainItemKind,
    /// Display label (`CHAINED-TOKEN-1`, .., `TOKEN`).
    pub label: String,
    /// The decoded token.
    pub token: &'a DecodedToken,
}

/// The delegation chain read from its root: proofs from the root-most
/// (last in the envelope) to the nearest, then the presented token.
#[must_use]
pub fn token_chain(envelope: &TokenEnvelope) -> Vec<ChainItem<'_>> {
    let mut chain: Vec<ChainItem<'_>> = envelope
        .proofs
        .iter()
        .rev()
        .zip(1_usize..)
        .map(|(token, n)| ChainItem {
            id: format!("chained_token_{n}"),
            kind: ChainItemKind::Chained,
            label: format!("CHAINED-TOKEN-{n}"),
            token,
        })
        .collect();
    chain.push(ChainItem {
        id: "end_of_chain_token".into(),
        kind: ChainItemKind::Active,
        label: "TOKEN".into(),
        token: &envelope.token,
    });
    chain
}
