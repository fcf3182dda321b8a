//! Adapter for zero-knowledge uniqueness proofs (worldcoin).
//!
//! The proof is verified against public inputs the adapter computes
//! itself: the signal is the submitting subject, the external nullifier is
//! this deployment's `(app_id, action)`. A proof generated for another
//! subject or another action therefore fails verification. The nullifier
//! hash plays the role of the identity key.

use ark_bn254::Fr;
use notabot_protocol::codec::decode_capability;
use notabot_protocol::config::UNSCORED_QUALITY;
use notabot_protocol::zkp::{external_nullifier, fr_to_bytes, signal_hash, UniquenessProof, UniquenessVerifier};
use notabot_protocol::{Address, IdentityKey, Source};
use tracing::{debug, warn};

use super::{admit, SourceAdapter, VerificationAccepted};
use crate::context::CallContext;
use crate::error::ContractError;
use crate::events::Event;
use crate::ledger::Ledger;
use crate::nullifier::ConsumedKeys;

pub struct CapabilityAdapter {
    address: Address,
    verifier: UniquenessVerifier,
    external_nullifier: Fr,
    /// When set, only proofs against this group root are accepted.
    pinned_root: Option<Fr>,
    consumed: ConsumedKeys,
    events: Vec<Event>,
}

impl CapabilityAdapter {
    pub fn new(address: Address, verifier: UniquenessVerifier, app_id: &str, action: &str) -> Self {
        Self {
            address,
            verifier,
            external_nullifier: external_nullifier(app_id, action),
            pinned_root: None,
            consumed: ConsumedKeys::new(),
            events: Vec::new(),
        }
    }

    pub fn with_pinned_root(mut self, root: Fr) -> Self {
        self.pinned_root = Some(root);
        self
    }

    pub fn pin_root(&mut self, root: Option<Fr>) {
        self.pinned_root = root;
    }

    pub fn external_nullifier(&self) -> Fr {
        self.external_nullifier
    }
}

impl SourceAdapter for CapabilityAdapter {
    fn source(&self) -> Source {
        Source::Worldcoin
    }

    fn address(&self) -> Address {
        self.address
    }

    fn verify_and_register(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        subject: Address,
        proof: &[u8],
    ) -> Result<VerificationAccepted, ContractError> {
        if subject.is_zero() {
            return Err(ContractError::InvalidAddress);
        }
        let wire = decode_capability(proof).map_err(|e| ContractError::MalformedProof(e.to_string()))?;
        let proof = UniquenessProof::from_capability(&wire)
            .map_err(|e| ContractError::MalformedProof(format!("{:#}", e)))?;

        let valid = self
            .verifier
            .verify(&proof, signal_hash(&subject), self.external_nullifier)
            .map_err(|e| ContractError::MalformedProof(format!("{:#}", e)))?;
        if !valid {
            warn!(%subject, "rejected: uniqueness proof invalid");
            return Err(ContractError::InvalidProof);
        }

        if let Some(root) = self.pinned_root {
            if proof.merkle_root != root {
                warn!(%subject, "rejected: proof against unknown group root");
                return Err(ContractError::UnknownMerkleRoot);
            }
        }

        let identity_key = IdentityKey::from_bytes(fr_to_bytes(&proof.nullifier_hash));
        debug!(%subject, nullifier = %identity_key, "uniqueness proof verified");

        admit(
            self.address,
            Source::Worldcoin,
            &mut self.consumed,
            &mut self.events,
            ledger,
            ctx,
            subject,
            identity_key,
            UNSCORED_QUALITY,
        )
    }

    fn is_consumed(&self, key: &IdentityKey) -> bool {
        self.consumed.contains(key)
    }

    fn events(&self) -> &[Event] {
        &self.events
    }
}
