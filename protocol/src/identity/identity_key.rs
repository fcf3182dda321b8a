//! # Identity Keys
//!
//! ```text
//! identity_key = SHA-256("{source}:{subject}:{provider_datum}")
//! ```
//!
//! `source` is the source name (`gitcoin`, `poh`, ...), `subject` the
//! canonical lowercase `0x` address, and `provider_datum` whatever stable
//! identifier the provider returned. Pure: same inputs, same key, forever.
//! The ledger treats a key it has seen once as spent.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::Address;
use crate::crypto::hash::sha256_array;
use crate::source::Source;

/// 32-byte identity key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IdentityKey([u8; 32]);

impl IdentityKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

/// Derive the identity key for one provider record.
///
/// ```
/// use notabot_protocol::identity::{derive_identity_key, Address};
/// use notabot_protocol::source::Source;
///
/// let subject = Address::derive("alice");
/// let a = derive_identity_key(Source::Gitcoin, &subject, "42.5");
/// let b = derive_identity_key(Source::Gitcoin, &subject, "42.5");
/// assert_eq!(a, b);
/// ```
pub fn derive_identity_key(source: Source, subject: &Address, provider_datum: &str) -> IdentityKey {
    let preimage = format!("{}:{}:{}", source.name(), subject.to_hex(), provider_datum);
    IdentityKey(sha256_array(preimage.as_bytes()))
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({}…)", &hex::encode(self.0)[..12])
    }
}

impl Serialize for IdentityKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IdentityKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid identity key hex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256_array;

    #[test]
    fn matches_documented_preimage() {
        let subject: Address = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".parse().unwrap();
        let key = derive_identity_key(Source::Poh, &subject, "sub-17");
        let expected =
            sha256_array(b"poh:0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa:sub-17");
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn differs_per_source_subject_and_datum() {
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        let base = derive_identity_key(Source::Gitcoin, &alice, "1");
        assert_ne!(base, derive_identity_key(Source::BrightId, &alice, "1"));
        assert_ne!(base, derive_identity_key(Source::Gitcoin, &bob, "1"));
        assert_ne!(base, derive_identity_key(Source::Gitcoin, &alice, "2"));
    }

    #[test]
    fn hex_roundtrip() {
        let key = derive_identity_key(Source::Gitcoin, &Address::derive("x"), "d");
        assert_eq!(IdentityKey::from_hex(&key.to_hex()), Some(key));
        assert_eq!(IdentityKey::from_hex("0x12"), None);
    }
}
