// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NotABot Protocol — Core Library
//!
//! Everything the oracle and the ledger must agree on, byte for byte.
//!
//! NotABot answers one question for third-party apps: "is this address a
//! verified unique human?". It does so by aggregating independent identity
//! providers. This crate is the shared protocol layer: the issuer side
//! (oracle signer) and the verifier side (source adapters) both build on it,
//! so a divergence here is a divergence everywhere.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants: validity window, defaults, limits.
//! - **crypto** — Ed25519 keys, prefixed-digest signatures, hashing.
//! - **identity** — Addresses and deterministic identity keys.
//! - **source** — The closed set of providers and their families.
//! - **attestation** — Canonical message packing and the oracle signer.
//! - **codec** — Proof wire encodings consumed by the adapters.
//! - **zkp** — Groth16 uniqueness proofs for capability sources.
//!
//! ## Design Philosophy
//!
//! 1. Bit-exactness over flexibility. One encoding per value.
//! 2. Signatures are checked before anything else is looked at.
//! 3. No unsafe code in crypto paths.

pub mod attestation;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod source;
pub mod zkp;

pub use attestation::{Attestation, Evidence, OracleSigner};
pub use identity::{Address, IdentityKey};
pub use source::Source;
