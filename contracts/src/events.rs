//! # Domain Events
//!
//! Append-only record of everything the ledger and the adapters did.
//! Serialized with an explicit `event` tag so downstream indexers can
//! dispatch on the name.

use notabot_protocol::{Address, IdentityKey, Source};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum Event {
    VerificationRegistered {
        subject: Address,
        source: Source,
        identity_key: IdentityKey,
        quality_score: u64,
        timestamp: u64,
    },
    AdapterAdded {
        adapter: Address,
        source: Source,
    },
    AdapterRemoved {
        adapter: Address,
        source: Source,
    },
    AnomalyDetected {
        subject: Address,
        reporter: Address,
        reason: String,
    },
    ConfidenceUpdated {
        source: Source,
        numerator: u64,
        denominator: u64,
    },
    AttackConfirmed {
        source: Source,
        subject: Address,
        confirmed_attacks: u64,
    },
    TokensRevoked {
        subject: Address,
        amount: u128,
    },
    /// Emitted by an adapter after the ledger accepted its registration.
    SourceVerified {
        source: Source,
        subject: Address,
        identity_key: IdentityKey,
        quality_score: u64,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::VerificationRegistered { .. } => "VerificationRegistered",
            Event::AdapterAdded { .. } => "AdapterAdded",
            Event::AdapterRemoved { .. } => "AdapterRemoved",
            Event::AnomalyDetected { .. } => "AnomalyDetected",
            Event::ConfidenceUpdated { .. } => "ConfidenceUpdated",
            Event::AttackConfirmed { .. } => "AttackConfirmed",
            Event::TokensRevoked { .. } => "TokensRevoked",
            Event::SourceVerified { .. } => "SourceVerified",
        }
    }
}
