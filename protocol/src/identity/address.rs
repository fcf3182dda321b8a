//! # Addresses
//!
//! A 20-byte account identifier. Parsing is liberal (either case, optional
//! `0x`); rendering is canonical (`0x`, lowercase). The canonical form is
//! what goes into identity keys, so two spellings of the same address can
//! never produce two keys.
//!
//! Oracle and adapter addresses are derived from public keys:
//!
//! ```text
//! address = BLAKE3(public_key)[12..32]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::ADDRESS_LENGTH;
use crate::crypto::hash::blake3_hash;
use crate::crypto::keys::OraclePublicKey;

/// Why a string is not an address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must be 40 hex characters (got {0})")]
    InvalidLength(usize),

    #[error("address contains non-hex characters")]
    InvalidHex,
}

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address. Never a valid subject or adapter.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LENGTH]
    }

    /// Last 20 bytes of BLAKE3 over the public key bytes.
    pub fn from_public_key(pk: &OraclePublicKey) -> Self {
        let hash = blake3_hash(pk.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&hash[32 - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Deterministic address for a label. Handy for wiring adapters and
    /// admins in tests and local deployments.
    pub fn derive(label: &str) -> Self {
        let hash = blake3_hash(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&hash[32 - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Canonical rendering: `0x` + 40 lowercase hex chars.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if body.len() != ADDRESS_LENGTH * 2 {
            return Err(AddressError::InvalidLength(body.len()));
        }
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(body, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
