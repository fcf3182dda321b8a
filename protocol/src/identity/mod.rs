//! # Identity Module
//!
//! The two identifiers every NotABot component agrees on:
//!
//! 1. **Address** — a 20-byte account id, rendered `0x` + 40 lowercase hex.
//!    Subjects, adapters, the admin and the oracle are all addresses. The
//!    oracle's address is derived from its Ed25519 public key.
//! 2. **IdentityKey** — a 32-byte deterministic hash binding a provider's
//!    evidence to a subject. It doubles as the replay key: one provider
//!    identity can back at most one verification, ever.

pub mod address;
pub mod identity_key;

pub use address::{Address, AddressError};
pub use identity_key::{derive_identity_key, IdentityKey};
