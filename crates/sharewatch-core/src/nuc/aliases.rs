//! Short display aliases for the DIDs appearing in one envelope.
//!
//! The map is built from a single envelope and owned by the caller; two
//! decodes never share numbering.

use serde::Serialize;

use super::TokenEnvelope;

/// One DID and its alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    /// Full DID string.
    pub did: String,
    /// Short label (`DID-1`, `DID-2`, ..).
    pub alias: String,
}

/// DID → alias mapping in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasMap {
    entries: Vec<AliasEntry>,
}

impl AliasMap {
    /// Assign aliases for every DID in `envelope`.
    ///
    /// Proofs are walked from the root of the chain (last) towards the
    /// presented token, which comes last; within a token the order is
    /// issuer, audience, subject.
    #[must_use]
    pub fn for_envelope(envelope: &TokenEnvelope) -> Self {
        let mut map = Self::default();
        let tokens = envelope
            .proofs
            .iter()
            .rev()
            .chain(std::iter::once(&envelope.token));
        for token in tokens {
            let p = &token.payload;
            for did in [&p.iss, &p.aud, &p.sub] {
                map.assign(did);
            }
        }
        map
    }

    fn assign(&mut self, did: &str) {
        if self.alias(did).is_some() {
            return;
        }
        let alias = format!("DID-{}", self.entries.len().saturating_add(1));
        self.entries.push(AliasEntry {
            did: did.to_owned(),
            alias,
        });
    }

    /// Alias for `did`, if it appeared in the envelope.
    #[must_use]
    pub fn alias(&self, did: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.did == did)
            .map(|e| e.alias.as_str())
    }

    /// Alias when known, otherwise the DID itself.
    #[must_use]
    pub fn display<'a>(&'a self, did: &'a str) -> &'a str {
        self.alias(did).unwrap_or(did)
    }

    /// Number of distinct DIDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no DID was seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }
}
