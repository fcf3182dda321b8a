//! # Oracle Keys
//!
//! Ed25519 keypair handling for the attestation oracle.
//!
//! NotABot has exactly one active signing key at a time. The oracle holds the
//! secret half; every source adapter is configured with the public half and
//! rejects anything it did not sign.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (ed25519-dalek does this for us).
//! - `generate()` uses `OsRng`. Everything else is deterministic from a seed.
//! - Key bytes are never logged. `Debug` prints the public half only.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::SIGNATURE_LENGTH;

/// Errors that can occur during key operations.
///
/// Intentionally vague about why something failed. Error text must never
/// carry key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not hex")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// The oracle's signing keypair.
///
/// Deliberately not `Serialize`. Exporting a secret should be an explicit
/// call to [`to_hex`](Self::to_hex), never a side effect of shoving the
/// keypair into a JSON body.
///
/// # Examples
///
/// ```
/// use notabot_protocol::crypto::keys::OracleKeypair;
///
/// let kp = OracleKeypair::generate();
/// let sig = kp.sign(b"digest");
/// assert!(kp.public_key().verify(b"digest", &sig));
/// ```
pub struct OracleKeypair {
    signing_key: SigningKey,
}

/// Public half of the oracle key. This is what adapters are configured with.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraclePublicKey {
    bytes: [u8; 32],
}

/// A 64-byte Ed25519 signature.
///
/// Deterministic for a given (key, message) pair, which is what makes
/// attestations reproducible.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OracleSignature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl OracleKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the 32-byte secret key *is* the seed. Weak seed, weak key.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse a hex secret key, with or without a `0x` prefix.
    ///
    /// This is how `ORACLE_PRIVATE_KEY` gets loaded.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&arr))
    }

    /// Export the secret as hex. Handle with care.
    pub fn to_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> OraclePublicKey {
        OraclePublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Sign arbitrary bytes.
    ///
    /// Attestation code never calls this with raw data; it goes through
    /// [`sign_digest`](super::signatures::sign_digest) so the message prefix
    /// is always applied.
    pub fn sign(&self, message: &[u8]) -> OracleSignature {
        OracleSignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }
}

impl Clone for OracleKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for OracleKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Public half only. A partial secret leak is still a leak.
        write!(f, "OracleKeypair(pub={})", self.public_key().to_hex())
    }
}

// ---------------------------------------------------------------------------
// OraclePublicKey
// ---------------------------------------------------------------------------

impl OraclePublicKey {
    /// Parse raw bytes, rejecting anything that is not a valid Ed25519 point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(arr)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Strict Ed25519 verification. `false` on any failure; callers only
    /// need yes or no.
    pub fn verify(&self, message: &[u8], signature: &OracleSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify_strict(message, &sig).is_ok()
    }
}

impl Hash for OraclePublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for OraclePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for OraclePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OraclePublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// OracleSignature
// ---------------------------------------------------------------------------

impl OracleSignature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse a slice. Wrong length is the only failure; whether the bytes
    /// verify is a separate question.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; SIGNATURE_LENGTH] = slice.try_into().ok()?;
        Some(Self { bytes })
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.bytes
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// `0x`-prefixed hex, the form the oracle returns over HTTP.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).ok()?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for OracleSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OracleSignature({}…)", &hex::encode(self.bytes)[..16])
    }
}

impl Serialize for OracleSignature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for OracleSignature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid signature hex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let kp = OracleKeypair::generate();
        let sig = kp.sign(b"attest");
        assert!(kp.public_key().verify(b"attest", &sig));
        assert!(!kp.public_key().verify(b"attesT", &sig));
    }

    #[test]
    fn signatures_are_deterministic() {
        let kp = OracleKeypair::from_seed(&[7u8; 32]);
        assert_eq!(kp.sign(b"same").to_bytes(), kp.sign(b"same").to_bytes());
    }

    #[test]
    fn wrong_key_rejects() {
        let a = OracleKeypair::from_seed(&[1u8; 32]);
        let b = OracleKeypair::from_seed(&[2u8; 32]);
        let sig = a.sign(b"msg");
        assert!(!b.public_key().verify(b"msg", &sig));
    }

    #[test]
    fn hex_roundtrip_with_and_without_prefix() {
        let kp = OracleKeypair::generate();
        let hex_key = kp.to_hex();
        let plain = OracleKeypair::from_hex(&hex_key).unwrap();
        let prefixed = OracleKeypair::from_hex(&format!("0x{hex_key}")).unwrap();
        assert_eq!(plain.public_key(), kp.public_key());
        assert_eq!(prefixed.public_key(), kp.public_key());
    }

    #[test]
    fn bad_secret_hex_rejected() {
        assert!(OracleKeypair::from_hex("zz").is_err());
        assert!(OracleKeypair::from_hex("abcd").is_err());
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let pk = OracleKeypair::generate().public_key();
        assert_eq!(OraclePublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
    }

    #[test]
    fn signature_serde_uses_prefixed_hex() {
        let sig = OracleKeypair::from_seed(&[3u8; 32]).sign(b"x");
        let json = serde_json::to_string(&sig).unwrap();
        assert!(json.starts_with("\"0x"));
        let back: OracleSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn debug_never_prints_secret() {
        let kp = OracleKeypair::from_seed(&[9u8; 32]);
        let dbg = format!("{kp:?}");
        assert!(!dbg.contains(&kp.to_hex()));
    }
}
