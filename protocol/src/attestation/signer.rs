//! # Oracle Signer
//!
//! Owns the single active signing key and nothing else. Construction takes
//! the keypair as injected configuration; there is no global key.
//!
//! ```
//! use notabot_protocol::attestation::OracleSigner;
//! use notabot_protocol::crypto::OracleKeypair;
//! use notabot_protocol::identity::{derive_identity_key, Address};
//! use notabot_protocol::source::Source;
//!
//! let signer = OracleSigner::new(OracleKeypair::generate());
//! let subject = Address::derive("alice");
//! let key = derive_identity_key(Source::Gitcoin, &subject, "42");
//! let att = signer.issue_attestation(subject, key, Some(42), 1_700_000_000);
//! assert!(att.verify(&signer.public_key()).is_ok());
//! ```

use thiserror::Error;
use tracing::debug;

use super::message::canonical_digest;
use super::{Attestation, Evidence};
use crate::crypto::keys::{OracleKeypair, OraclePublicKey};
use crate::crypto::signatures::sign_digest;
use crate::identity::{derive_identity_key, Address, IdentityKey};
use crate::source::Source;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttestationError {
    #[error("score {score} is below the minimum of {min_score}")]
    ScoreTooLow { score: u64, min_score: u64 },

    #[error("scored source returned no score")]
    MissingScore,
}

/// Pure threshold gate: `score >= min_score`.
pub fn meets_threshold(score: u64, min_score: u64) -> bool {
    score >= min_score
}

pub struct OracleSigner {
    keypair: OracleKeypair,
    address: Address,
}

impl OracleSigner {
    pub fn new(keypair: OracleKeypair) -> Self {
        let address = Address::from_public_key(&keypair.public_key());
        Self { keypair, address }
    }

    /// The oracle's own address, as reported by `/health`.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The key adapters must be configured with.
    pub fn public_key(&self) -> OraclePublicKey {
        self.keypair.public_key()
    }

    /// Sign `(subject, identity_key, score?, issued_at)`.
    ///
    /// Deterministic: identical inputs give byte-identical attestations.
    pub fn issue_attestation(
        &self,
        subject: Address,
        identity_key: IdentityKey,
        score: Option<u64>,
        issued_at: u64,
    ) -> Attestation {
        let digest = canonical_digest(&subject, &identity_key, score, issued_at);
        let signature = sign_digest(&self.keypair, &digest);
        debug!(%subject, %identity_key, issued_at, "attestation signed");
        Attestation {
            subject,
            identity_key,
            score,
            issued_at,
            signature,
        }
    }

    /// Full oracle pipeline after the provider call: threshold gate, key
    /// derivation, signature. `min_score` only applies to scored sources.
    pub fn attest(
        &self,
        source: Source,
        subject: Address,
        evidence: &Evidence,
        min_score: u64,
        issued_at: u64,
    ) -> Result<Attestation, AttestationError> {
        let score = if source.is_scored() {
            let score = evidence.score.ok_or(AttestationError::MissingScore)?;
            if !meets_threshold(score, min_score) {
                return Err(AttestationError::ScoreTooLow { score, min_score });
            }
            Some(score)
        } else {
            None
        };
        let identity_key = derive_identity_key(source, &subject, &evidence.provider_datum);
        Ok(self.issue_attestation(subject, identity_key, score, issued_at))
    }
}

impl std::fmt::Debug for OracleSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
