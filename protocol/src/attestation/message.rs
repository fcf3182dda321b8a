//! # Canonical Attestation Message
//!
//! The one byte layout the oracle and every adapter must agree on:
//!
//! ```text
//! digest = SHA-256( subject            20 bytes
//!                || identity_key       32 bytes
//!                || score              32 bytes, u256 big-endian  (scored sources only)
//!                || issued_at          32 bytes, u256 big-endian )
//! ```
//!
//! Fixed-width packing, no length prefixes. Presence of the score word is
//! decided by the source family, never by the data, so a scored attestation
//! can't be re-read as an unscored one.

use crate::crypto::hash::sha256_multi;
use crate::identity::{Address, IdentityKey};

/// Left-pad a `u64` into a 32-byte big-endian word.
pub fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Compute the canonical digest for an attestation's signed fields.
pub fn canonical_digest(
    subject: &Address,
    identity_key: &IdentityKey,
    score: Option<u64>,
    issued_at: u64,
) -> [u8; 32] {
    let issued_word = u64_word(issued_at);
    match score {
        Some(score) => {
            let score_word = u64_word(score);
            sha256_multi(&[
                subject.as_bytes(),
                identity_key.as_bytes(),
                &score_word,
                &issued_word,
            ])
        }
        None => sha256_multi(&[subject.as_bytes(), identity_key.as_bytes(), &issued_word]),
    }
}
