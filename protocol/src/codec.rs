//! # Proof Wire Codecs
//!
//! Adapters receive opaque bytes. This module turns them into typed proofs
//! and back. Every layout is a sequence of 32-byte words, ABI style:
//!
//! ```text
//! scored     identity_key | score | issued_at | 0x80 | 64 | sig[0..32] | sig[32..64]
//! unscored   identity_key | issued_at | 0x60 | 64 | sig[0..32] | sig[32..64]
//! capability merkle_root | nullifier_hash | proof[0] .. proof[7]
//! ```
//!
//! The signature travels as a dynamic `bytes` value: an offset word pointing
//! past the head, a length word (always 64), then the payload. Integers sit
//! big-endian in the low 8 bytes of their word; any non-zero high byte is a
//! decoding error, not a silent truncation.
//!
//! Decoding is strict. Wrong total length, wrong offset, wrong length word:
//! all rejected. There is exactly one valid encoding per proof.

use thiserror::Error;

use crate::attestation::{u64_word, Attestation};
use crate::config::{SIGNATURE_LENGTH, WORD_LENGTH};
use crate::crypto::keys::OracleSignature;
use crate::identity::IdentityKey;

/// Uncompressed Groth16 proof size: A (G1, 64) + B (G2, 128) + C (G1, 64).
pub const CAPABILITY_PROOF_LENGTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("expected {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("integer word {index} overflows u64")]
    IntegerOverflow { index: usize },

    #[error("signature offset word is {got}, expected {expected}")]
    BadOffset { expected: u64, got: u64 },

    #[error("signature length word is {0}, expected 64")]
    BadSignatureLength(u64),
}

/// The decoded form of a signed-attestation proof. The subject is not on
/// the wire; the adapter supplies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedProof {
    pub identity_key: IdentityKey,
    pub score: Option<u64>,
    pub issued_at: u64,
    pub signature: OracleSignature,
}

impl From<&Attestation> for SignedProof {
    fn from(att: &Attestation) -> Self {
        Self {
            identity_key: att.identity_key,
            score: att.score,
            issued_at: att.issued_at,
            signature: att.signature,
        }
    }
}

/// The decoded form of a capability (zero-knowledge) proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityProof {
    pub merkle_root: [u8; 32],
    pub nullifier_hash: [u8; 32],
    pub proof: [u8; CAPABILITY_PROOF_LENGTH],
}

// ---------------------------------------------------------------------------
// Word helpers
// ---------------------------------------------------------------------------

fn word(bytes: &[u8], index: usize) -> &[u8] {
    &bytes[index * WORD_LENGTH..(index + 1) * WORD_LENGTH]
}

fn word_array(bytes: &[u8], index: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(word(bytes, index));
    out
}

fn read_u64(bytes: &[u8], index: usize) -> Result<u64, CodecError> {
    let w = word(bytes, index);
    if w[..24].iter().any(|b| *b != 0) {
        return Err(CodecError::IntegerOverflow { index });
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&w[24..]);
    Ok(u64::from_be_bytes(low))
}

// ---------------------------------------------------------------------------
// Signed attestations
// ---------------------------------------------------------------------------

/// Number of head words before the signature tail.
const fn head_words(scored: bool) -> usize {
    if scored {
        4
    } else {
        3
    }
}

/// Total encoded size: head + length word + two signature words.
pub const fn signed_proof_length(scored: bool) -> usize {
    (head_words(scored) + 3) * WORD_LENGTH
}

/// Encode a signed proof. The score word is emitted iff `score` is `Some`.
pub fn encode_signed(proof: &SignedProof) -> Vec<u8> {
    let scored = proof.score.is_some();
    let mut out = Vec::with_capacity(signed_proof_length(scored));
    out.extend_from_slice(proof.identity_key.as_bytes());
    if let Some(score) = proof.score {
        out.extend_from_slice(&u64_word(score));
    }
    out.extend_from_slice(&u64_word(proof.issued_at));
    out.extend_from_slice(&u64_word((head_words(scored) * WORD_LENGTH) as u64));
    out.extend_from_slice(&u64_word(SIGNATURE_LENGTH as u64));
    out.extend_from_slice(proof.signature.as_bytes());
    out
}

/// Convenience: encode an attestation for submission to its adapter.
pub fn encode_attestation(att: &Attestation) -> Vec<u8> {
    encode_signed(&SignedProof::from(att))
}

/// Decode a signed proof. `scored` comes from the adapter's source family.
pub fn decode_signed(bytes: &[u8], scored: bool) -> Result<SignedProof, CodecError> {
    let expected = signed_proof_length(scored);
    if bytes.len() != expected {
        return Err(CodecError::WrongLength {
            expected,
            got: bytes.len(),
        });
    }

    let identity_key = IdentityKey::from_bytes(word_array(bytes, 0));
    let (score, issued_idx) = if scored {
        (Some(read_u64(bytes, 1)?), 2)
    } else {
        (None, 1)
    };
    let issued_at = read_u64(bytes, issued_idx)?;

    let head = head_words(scored);
    let offset = read_u64(bytes, head - 1)?;
    let expected_offset = (head * WORD_LENGTH) as u64;
    if offset != expected_offset {
        return Err(CodecError::BadOffset {
            expected: expected_offset,
            got: offset,
        });
    }
    let sig_len = read_u64(bytes, head)?;
    if sig_len != SIGNATURE_LENGTH as u64 {
        return Err(CodecError::BadSignatureLength(sig_len));
    }

    let sig_start = (head + 1) * WORD_LENGTH;
    let mut sig = [0u8; SIGNATURE_LENGTH];
    sig.copy_from_slice(&bytes[sig_start..sig_start + SIGNATURE_LENGTH]);

    Ok(SignedProof {
        identity_key,
        score,
        issued_at,
        signature: OracleSignature::from_bytes(sig),
    })
}

// ---------------------------------------------------------------------------
// Capability proofs
// ---------------------------------------------------------------------------

pub const CAPABILITY_ENCODED_LENGTH: usize = 2 * WORD_LENGTH + CAPABILITY_PROOF_LENGTH;

pub fn encode_capability(proof: &CapabilityProof) -> Vec<u8> {
    let mut out = Vec::with_capacity(CAPABILITY_ENCODED_LENGTH);
    out.extend_from_slice(&proof.merkle_root);
    out.extend_from_slice(&proof.nullifier_hash);
    out.extend_from_slice(&proof.proof);
    out
}

pub fn decode_capability(bytes: &[u8]) -> Result<CapabilityProof, CodecError> {
    if bytes.len() != CAPABILITY_ENCODED_LENGTH {
        return Err(CodecError::WrongLength {
            expected: CAPABILITY_ENCODED_LENGTH,
            got: bytes.len(),
        });
    }
    let mut proof = [0u8; CAPABILITY_PROOF_LENGTH];
    proof.copy_from_slice(&bytes[2 * WORD_LENGTH..]);
    Ok(CapabilityProof {
        merkle_root: word_array(bytes, 0),
        nullifier_hash: word_array(bytes, 1),
        proof,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: Option<u64>) -> SignedProof {
        SignedProof {
            identity_key: IdentityKey::from_bytes([0xAA; 32]),
            score,
            issued_at: 1_700_000_000,
            signature: OracleSignature::from_bytes([0x5C; 64]),
        }
    }

    #[test]
    fn scored_layout() {
        let bytes = encode_signed(&sample(Some(75)));
        assert_eq!(bytes.len(), 7 * 32);
        assert_eq!(&bytes[..32], &[0xAA; 32]);
        assert_eq!(word(&bytes, 1), &u64_word(75));
        assert_eq!(word(&bytes, 3), &u64_word(128));
        assert_eq!(word(&bytes, 4), &u64_word(64));
        assert_eq!(decode_signed(&bytes, true).unwrap(), sample(Some(75)));
    }

    #[test]
    fn unscored_layout() {
        let bytes = encode_signed(&sample(None));
        assert_eq!(bytes.len(), 6 * 32);
        assert_eq!(word(&bytes, 2), &u64_word(96));
        assert_eq!(decode_signed(&bytes, false).unwrap(), sample(None));
    }

    #[test]
    fn family_mismatch_is_a_length_error() {
        let bytes = encode_signed(&sample(Some(1)));
        assert!(matches!(
            decode_signed(&bytes, false),
            Err(CodecError::WrongLength { .. })
        ));
    }

    #[test]
    fn nonzero_high_bytes_rejected() {
        let mut bytes = encode_signed(&sample(Some(75)));
        bytes[32] = 1; // high byte of the score word
        assert_eq!(
            decode_signed(&bytes, true),
            Err(CodecError::IntegerOverflow { index: 1 })
        );
    }

    #[test]
    fn bad_offset_and_length_rejected() {
        let mut bytes = encode_signed(&sample(None));
        bytes[2 * 32 + 31] = 0x40;
        assert!(matches!(
            decode_signed(&bytes, false),
            Err(CodecError::BadOffset { .. })
        ));

        let mut bytes = encode_signed(&sample(None));
        bytes[3 * 32 + 31] = 65;
        assert_eq!(
            decode_signed(&bytes, false),
            Err(CodecError::BadSignatureLength(65))
        );
    }

    #[test]
    fn truncated_input_rejected() {
        assert!(decode_signed(&[0u8; 10], true).is_err());
        assert!(decode_capability(&[0u8; 100]).is_err());
    }

    #[test]
    fn capability_layout() {
        let proof = CapabilityProof {
            merkle_root: [1; 32],
            nullifier_hash: [2; 32],
            proof: [3; CAPABILITY_PROOF_LENGTH],
        };
        let bytes = encode_capability(&proof);
        assert_eq!(bytes.len(), 10 * 32);
        assert_eq!(decode_capability(&bytes).unwrap(), proof);
    }
}
