//! # Cryptographic Primitives
//!
//! Everything the oracle signs and everything an adapter checks flows
//! through here. Boring, audited building blocks only:
//!
//! - **Ed25519** for attestation signatures. Deterministic (RFC 8032), so
//!   the same attestation always carries the same signature.
//! - **SHA-256** for the canonical attestation digest and identity keys.
//! - **BLAKE3** for address derivation and field hashing.
//!
//! Nothing here is clever. If you are tempted to make it clever, don't.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{blake3_hash, hash_to_field, sha256, sha256_array};
pub use keys::{KeyError, OracleKeypair, OraclePublicKey, OracleSignature};
pub use signatures::{sign_digest, verify_digest, SignatureError};
