//! # Source Adapters
//!
//! One adapter per provider. An adapter validates a proof in the provider's
//! own format and, if it holds up, registers the verification with the
//! ledger under the adapter's own address.
//!
//! Two families:
//!
//! - [`SignedAttestationAdapter`] — oracle-signed attestations (gitcoin,
//!   poh, brightid).
//! - [`CapabilityAdapter`] — self-contained zero-knowledge uniqueness
//!   proofs (worldcoin).
//!
//! Both end in [`admit`]: mark the key in the adapter's replay set, call the
//! ledger, and roll the mark back if the ledger refuses.

pub mod capability;
pub mod signed;

pub use capability::CapabilityAdapter;
pub use signed::SignedAttestationAdapter;

use notabot_protocol::{Address, IdentityKey, Source};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::CallContext;
use crate::error::ContractError;
use crate::events::Event;
use crate::ledger::{Ledger, RegistrationReceipt};
use crate::nullifier::ConsumedKeys;

/// Result of an accepted proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationAccepted {
    pub source: Source,
    pub subject: Address,
    pub identity_key: IdentityKey,
    pub quality_score: u64,
    pub receipt: RegistrationReceipt,
}

pub trait SourceAdapter: Send {
    fn source(&self) -> Source;

    fn source_id(&self) -> u8 {
        self.source().id()
    }

    /// The adapter's caller identity toward the ledger.
    fn address(&self) -> Address;

    /// Validate `proof` for `subject` and register it with `ledger`.
    fn verify_and_register(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        subject: Address,
        proof: &[u8],
    ) -> Result<VerificationAccepted, ContractError>;

    /// Whether `key` has been consumed by this adapter.
    fn is_consumed(&self, key: &IdentityKey) -> bool;

    fn events(&self) -> &[Event];
}

/// Replay check, ledger registration and event emission shared by every
/// adapter. Leaves `consumed` untouched on error.
#[allow(clippy::too_many_arguments)]
pub(crate) fn admit(
    adapter: Address,
    source: Source,
    consumed: &mut ConsumedKeys,
    events: &mut Vec<Event>,
    ledger: &mut Ledger,
    ctx: &CallContext,
    subject: Address,
    identity_key: IdentityKey,
    quality_score: u64,
) -> Result<VerificationAccepted, ContractError> {
    if !consumed.insert_if_absent(identity_key) {
        warn!(%subject, %source, key = %identity_key, "rejected: proof already used");
        return Err(ContractError::ProofAlreadyUsed);
    }

    let receipt = match ledger.register_verification(
        &ctx.as_caller(adapter),
        subject,
        source,
        identity_key,
        quality_score,
    ) {
        Ok(receipt) => receipt,
        Err(e) => {
            consumed.remove(&identity_key);
            warn!(%subject, %source, error = %e, "ledger refused registration");
            return Err(e);
        }
    };

    events.push(Event::SourceVerified {
        source,
        subject,
        identity_key,
        quality_score,
    });
    info!(%subject, %source, quality_score, "proof accepted");

    Ok(VerificationAccepted {
        source,
        subject,
        identity_key,
        quality_score,
        receipt,
    })
}
