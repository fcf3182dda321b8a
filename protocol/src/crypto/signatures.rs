//! # Attestation Signatures
//!
//! The oracle never signs raw data. It signs a 32-byte digest wrapped in the
//! NotABot personal-message prefix:
//!
//! ```text
//! signed = "\x19NotABot Signed Message:\n32" || digest
//! ```
//!
//! so a signature produced here can't be replayed as a signature over any
//! other message format, and no other protocol's signature can be passed
//! off as an attestation.
//!
//! Verification is strict (`verify_strict`): malleable and small-order
//! encodings are rejected outright.

use thiserror::Error;

use super::keys::{OracleKeypair, OraclePublicKey, OracleSignature};
use crate::config::SIGNED_MESSAGE_PREFIX;

/// Errors during signature operations.
///
/// Intentionally vague. "Wrong key" and "tampered message" look the same.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignatureBytes,
}

/// Build the exact bytes the oracle signs for a digest.
pub fn prefixed_message(digest: &[u8; 32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SIGNED_MESSAGE_PREFIX.len() + digest.len());
    out.extend_from_slice(SIGNED_MESSAGE_PREFIX);
    out.extend_from_slice(digest);
    out
}

/// Sign a digest under the personal-message prefix.
///
/// ```
/// use notabot_protocol::crypto::{sign_digest, verify_digest, OracleKeypair};
///
/// let kp = OracleKeypair::generate();
/// let digest = [0x11u8; 32];
/// let sig = sign_digest(&kp, &digest);
/// assert!(verify_digest(&kp.public_key(), &digest, &sig).is_ok());
/// ```
pub fn sign_digest(keypair: &OracleKeypair, digest: &[u8; 32]) -> OracleSignature {
    keypair.sign(&prefixed_message(digest))
}

/// Verify a prefixed-digest signature against the oracle key.
pub fn verify_digest(
    public_key: &OraclePublicKey,
    digest: &[u8; 32],
    signature: &OracleSignature,
) -> Result<(), SignatureError> {
    if public_key.verify(&prefixed_message(digest), signature) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}

/// Wire variant: the signature arrives as an untyped slice.
pub fn verify_digest_raw(
    public_key: &OraclePublicKey,
    digest: &[u8; 32],
    signature_bytes: &[u8],
) -> Result<(), SignatureError> {
    let signature =
        OracleSignature::from_slice(signature_bytes).ok_or(SignatureError::InvalidSignatureBytes)?;
    verify_digest(public_key, digest, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_digest() {
        let kp = OracleKeypair::generate();
        let digest = [0xABu8; 32];
        let sig = sign_digest(&kp, &digest);
        assert!(verify_digest(&kp.public_key(), &digest, &sig).is_ok());
    }

    #[test]
    fn test_prefix_is_applied() {
        // A signature over the bare digest must not pass as an attestation.
        let kp = OracleKeypair::generate();
        let digest = [0x01u8; 32];
        let bare = kp.sign(&digest);
        assert_eq!(
            verify_digest(&kp.public_key(), &digest, &bare),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_tampered_digest_fails() {
        let kp = OracleKeypair::generate();
        let mut digest = [0x02u8; 32];
        let sig = sign_digest(&kp, &digest);
        digest[31] ^= 1;
        assert!(verify_digest(&kp.public_key(), &digest, &sig).is_err());
    }

    #[test]
    fn test_verify_raw_wrong_length() {
        let kp = OracleKeypair::generate();
        assert_eq!(
            verify_digest_raw(&kp.public_key(), &[0u8; 32], &[0u8; 63]),
            Err(SignatureError::InvalidSignatureBytes)
        );
    }

    #[test]
    fn test_prefixed_message_layout() {
        let msg = prefixed_message(&[0xFFu8; 32]);
        assert_eq!(msg.len(), SIGNED_MESSAGE_PREFIX.len() + 32);
        assert!(msg.starts_with(SIGNED_MESSAGE_PREFIX));
    }
}
