//! # Attestations
//!
//! An attestation is the oracle's signed, time-bounded statement that a
//! subject passed one provider's verification:
//!
//! ```text
//! { subject, identity_key, score?, issued_at, signature }
//! ```
//!
//! Lifecycle:
//!
//! 1. The oracle fetches [`Evidence`] from a provider.
//! 2. [`meets_threshold`] gates scored sources before anything is signed.
//! 3. [`derive_identity_key`](crate::identity::derive_identity_key) binds
//!    the provider datum to the subject.
//! 4. [`OracleSigner::issue_attestation`] signs the canonical digest.
//! 5. An adapter re-derives the digest, checks the signature, then the
//!    validity window ([`Attestation::is_expired`]).
//!
//! Freshness is judged at verification time. An attestation issued "in the
//! future" by a skewed oracle clock is not expired.

pub mod message;
pub mod signer;

pub use message::{canonical_digest, u64_word};
pub use signer::{meets_threshold, AttestationError, OracleSigner};

use serde::{Deserialize, Serialize};

use crate::config::VALIDITY_WINDOW_SECS;
use crate::crypto::keys::{OraclePublicKey, OracleSignature};
use crate::crypto::signatures::{verify_digest, SignatureError};
use crate::identity::{Address, IdentityKey};

/// What a provider told the oracle about one subject.
///
/// Raw provider responses never leave the fetch call; this is all that
/// survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Provider score, floored to an integer. `None` for unscored sources.
    pub score: Option<u64>,
    /// Stable provider-side identifier fed into the identity key.
    pub provider_datum: String,
}

/// A signed attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub subject: Address,
    pub identity_key: IdentityKey,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<u64>,
    pub issued_at: u64,
    pub signature: OracleSignature,
}

impl Attestation {
    /// Digest the signature is expected to cover.
    pub fn digest(&self) -> [u8; 32] {
        canonical_digest(&self.subject, &self.identity_key, self.score, self.issued_at)
    }

    /// Check the signature against the configured oracle key.
    pub fn verify(&self, oracle: &OraclePublicKey) -> Result<(), SignatureError> {
        verify_digest(oracle, &self.digest(), &self.signature)
    }

    /// Last second (inclusive) at which the attestation is admissible.
    pub fn expires_at(&self) -> u64 {
        self.issued_at.saturating_add(VALIDITY_WINDOW_SECS)
    }

    /// `now - issued_at > VALIDITY_WINDOW`, with the subtraction saturating
    /// at zero for future timestamps.
    pub fn is_expired(&self, now: u64) -> bool {
        is_expired(self.issued_at, now)
    }
}

/// Freestanding form of [`Attestation::is_expired`] for callers that only
/// hold the timestamp.
pub fn is_expired(issued_at: u64, now: u64) -> bool {
    now.saturating_sub(issued_at) > VALIDITY_WINDOW_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundary_is_inclusive() {
        assert!(!is_expired(1_000, 1_000 + VALIDITY_WINDOW_SECS));
        assert!(is_expired(1_000, 1_000 + VALIDITY_WINDOW_SECS + 1));
    }

    #[test]
    fn future_timestamps_are_fresh() {
        assert!(!is_expired(10_000, 5_000));
    }

    #[test]
    fn two_hours_old_is_expired() {
        let now = 1_700_000_000;
        assert!(is_expired(now - 7_200, now));
    }
}
