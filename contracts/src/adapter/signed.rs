//! Adapter for oracle-signed attestations.
//!
//! Checks, in order: proof decodes for the source's schema, signature by
//! the configured oracle key, freshness, minimum score, replay. Nothing
//! but decoding runs before the signature check.

use notabot_protocol::attestation::{is_expired, message::canonical_digest};
use notabot_protocol::codec::decode_signed;
use notabot_protocol::config::UNSCORED_QUALITY;
use notabot_protocol::crypto::{verify_digest, OraclePublicKey};
use notabot_protocol::source::SourceFamily;
use notabot_protocol::{Address, IdentityKey, Source};
use tracing::{debug, warn};

use super::{admit, SourceAdapter, VerificationAccepted};
use crate::context::CallContext;
use crate::error::ContractError;
use crate::events::Event;
use crate::ledger::Ledger;
use crate::nullifier::ConsumedKeys;

pub struct SignedAttestationAdapter {
    source: Source,
    address: Address,
    oracle_key: OraclePublicKey,
    consumed: ConsumedKeys,
    events: Vec<Event>,
}

impl SignedAttestationAdapter {
    /// `source` must be a signed-attestation source.
    pub fn new(source: Source, address: Address, oracle_key: OraclePublicKey) -> Result<Self, ContractError> {
        if source.family() == SourceFamily::Capability {
            return Err(ContractError::UnsupportedSource(source));
        }
        Ok(Self {
            source,
            address,
            oracle_key,
            consumed: ConsumedKeys::new(),
            events: Vec::new(),
        })
    }

    pub fn oracle_key(&self) -> &OraclePublicKey {
        &self.oracle_key
    }
}

impl SourceAdapter for SignedAttestationAdapter {
    fn source(&self) -> Source {
        self.source
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
        let scored = self.source.is_scored();
        let decoded = decode_signed(proof, scored)
            .map_err(|e| ContractError::MalformedProof(e.to_string()))?;

        let digest = canonical_digest(&subject, &decoded.identity_key, decoded.score, decoded.issued_at);
        if verify_digest(&self.oracle_key, &digest, &decoded.signature).is_err() {
            warn!(%subject, source = %self.source, "rejected: bad oracle signature");
            return Err(ContractError::InvalidSignature);
        }

        if is_expired(decoded.issued_at, ctx.timestamp) {
            warn!(%subject, issued_at = decoded.issued_at, now = ctx.timestamp, "rejected: expired");
            return Err(ContractError::ProofExpired {
                issued_at: decoded.issued_at,
                now: ctx.timestamp,
            });
        }

        let quality_score = match decoded.score {
            Some(score) => {
                let min_score = ledger.source_profile(self.source).min_score;
                if score < min_score {
                    warn!(%subject, score, min_score, "rejected: score too low");
                    return Err(ContractError::ScoreTooLow { score, min_score });
                }
                score
            }
            None => UNSCORED_QUALITY,
        };

        debug!(%subject, source = %self.source, quality_score, "signed proof checks passed");

        admit(
            self.address,
            self.source,
            &mut self.consumed,
            &mut self.events,
            ledger,
            ctx,
            subject,
            decoded.identity_key,
            quality_score,
        )
    }

    fn is_consumed(&self, key: &IdentityKey) -> bool {
        self.consumed.contains(key)
    }

    fn events(&self) -> &[Event] {
        &self.events
    }
}
