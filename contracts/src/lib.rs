//! # NotABot Contracts
//!
//! The verification side of NotABot: everything that decides whether a
//! proof is accepted and what acceptance is worth.
//!
//! - **Ledger** — records verifications per `(subject, source)`, tracks
//!   per-source reliability, computes trust score and human probability,
//!   issues reward credentials.
//! - **Adapters** — one per provider; validate a proof in the provider's
//!   format and register it with the ledger.
//! - **Reward credentials** — a fungible token and a soulbound badge.
//! - **Deployment** — ledger and adapters behind a single lock.
//!
//! ## Design Principles
//!
//! 1. All balance arithmetic is checked.
//! 2. Every mutating call is all-or-nothing: validation first, then the
//!    one fallible mutation, then the infallible rest.
//! 3. Time and caller are explicit ([`CallContext`]), never ambient.
//! 4. Every public type is serializable (serde) for persistence and
//!    event indexing.

pub mod adapter;
pub mod confidence;
pub mod context;
pub mod deployment;
pub mod error;
pub mod events;
pub mod ledger;
pub mod nullifier;
pub mod reward;

pub use adapter::{CapabilityAdapter, SignedAttestationAdapter, SourceAdapter, VerificationAccepted};
pub use confidence::{Confidence, Probability};
pub use context::CallContext;
pub use deployment::Deployment;
pub use error::{ContractError, ErrorCategory};
pub use events::Event;
pub use ledger::{Ledger, LedgerConfig};
