//! # Attestation Service
//!
//! The oracle's request pipeline, independent of HTTP:
//!
//! 1. reject capability sources (they never go through the oracle),
//! 2. fetch evidence from the source's provider (one call, no retry),
//! 3. gate scored sources on the minimum score,
//! 4. derive the identity key and sign the attestation at "now".
//!
//! Stateless per request; share it behind an `Arc`.

use chrono::Utc;
use notabot_protocol::attestation::AttestationError;
use notabot_protocol::codec::encode_attestation;
use notabot_protocol::source::SourceFamily;
use notabot_protocol::{Address, Attestation, IdentityKey, OracleSigner, Source};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::OracleError;
use crate::metrics::SharedMetrics;
use crate::providers::{EvidenceProvider, ProviderSet};

/// What the client gets back: everything needed to call the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedVerification {
    pub source: Source,
    pub subject: Address,
    pub identity_key: IdentityKey,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<u64>,
    pub issued_at: u64,
    /// 0x-prefixed 64-byte Ed25519 signature.
    pub signature: String,
    pub expires_at: u64,
    pub oracle_address: Address,
    /// 0x-prefixed wire encoding, ready for `verify_and_register`.
    pub proof: String,
}

impl SignedVerification {
    fn from_attestation(source: Source, att: &Attestation, oracle_address: Address) -> Self {
        Self {
            source,
            subject: att.subject,
            identity_key: att.identity_key,
            score: att.score,
            issued_at: att.issued_at,
            signature: att.signature.to_hex(),
            expires_at: att.expires_at(),
            oracle_address,
            proof: format!("0x{}", hex::encode(encode_attestation(att))),
        }
    }
}

pub struct OracleService {
    signer: OracleSigner,
    providers: ProviderSet,
    gitcoin_min_score: u64,
    metrics: SharedMetrics,
}

impl OracleService {
    pub fn new(
        signer: OracleSigner,
        providers: ProviderSet,
        gitcoin_min_score: u64,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            signer,
            providers,
            gitcoin_min_score,
            metrics,
        }
    }

    pub fn oracle_address(&self) -> Address {
        self.signer.address()
    }

    /// Sources with a configured provider, in id order.
    pub fn enabled_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|s| self.providers.contains_key(s))
            .collect()
    }

    fn min_score(&self, source: Source) -> u64 {
        match source {
            Source::Gitcoin => self.gitcoin_min_score,
            other => other.default_min_score(),
        }
    }

    fn provider(&self, source: Source) -> Result<&Arc<dyn EvidenceProvider>, OracleError> {
        if source.family() == SourceFamily::Capability {
            return Err(OracleError::UnsupportedSource(source));
        }
        self.providers
            .get(&source)
            .ok_or(OracleError::UnsupportedSource(source))
    }

    /// Run the full pipeline for one subject, timestamped with the wall
    /// clock.
    pub async fn verify(&self, source: Source, subject: Address) -> Result<SignedVerification, OracleError> {
        let now = Utc::now().timestamp().max(0) as u64;
        self.verify_at(source, subject, now).await
    }

    pub async fn verify_at(
        &self,
        source: Source,
        subject: Address,
        issued_at: u64,
    ) -> Result<SignedVerification, OracleError> {
        let provider = self.provider(source)?;

        let timer = self
            .metrics
            .upstream_latency_seconds
            .with_label_values(&[source.name()])
            .start_timer();
        let fetched = provider.fetch_evidence(&subject).await;
        timer.observe_duration();
        let evidence = fetched?;

        let min_score = self.min_score(source);
        let attestation = self
            .signer
            .attest(source, subject, &evidence, min_score, issued_at)
            .map_err(|e| match e {
                AttestationError::ScoreTooLow { score, min_score } => {
                    warn!(%subject, %source, score, min_score, "score below threshold, not signing");
                    OracleError::ScoreTooLow { score, min_score }
                }
                AttestationError::MissingScore => OracleError::UpstreamUnavailable {
                    provider: source,
                    reason: "provider returned no score".into(),
                },
            })?;

        self.metrics
            .attestations_issued_total
            .with_label_values(&[source.name()])
            .inc();
        info!(
            %subject,
            %source,
            score = ?attestation.score,
            issued_at,
            "attestation issued"
        );

        Ok(SignedVerification::from_attestation(
            source,
            &attestation,
            self.signer.address(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metrics::OracleMetrics;
    use async_trait::async_trait;
    use notabot_protocol::codec::decode_signed;
    use notabot_protocol::crypto::OracleKeypair;
    use notabot_protocol::identity::derive_identity_key;
    use notabot_protocol::Evidence;
    use std::collections::HashMap;

    /// Provider that answers from a fixed result.
    pub(crate) struct MockProvider {
        pub source: Source,
        pub result: fn() -> Result<Evidence, OracleError>,
    }

    #[async_trait]
    impl EvidenceProvider for MockProvider {
        fn source(&self) -> Source {
            self.source
        }

        async fn fetch_evidence(&self, _subject: &Address) -> Result<Evidence, OracleError> {
            (self.result)()
        }
    }

    pub(crate) fn service_with(mocks: Vec<MockProvider>) -> OracleService {
        let mut providers: ProviderSet = HashMap::new();
        for m in mocks {
            providers.insert(m.source, Arc::new(m));
        }
        OracleService::new(
            OracleSigner::new(OracleKeypair::from_seed(&[0x42; 32])),
            providers,
            20,
            Arc::new(OracleMetrics::new().unwrap()),
        )
    }

    fn gitcoin(score: u64) -> Result<Evidence, OracleError> {
        Ok(Evidence {
            score: Some(score),
            provider_datum: format!("{score}.5"),
        })
    }

    #[tokio::test]
    async fn signs_scored_evidence() {
        let svc = service_with(vec![MockProvider {
            source: Source::Gitcoin,
            result: || gitcoin(75),
        }]);
        let subject = Address::derive("alice");
        let out = svc.verify_at(Source::Gitcoin, subject, 1_000).await.unwrap();

        assert_eq!(out.score, Some(75));
        assert_eq!(out.expires_at, 1_000 + 3_600);
        assert_eq!(
            out.identity_key,
            derive_identity_key(Source::Gitcoin, &subject, "75.5")
        );

        let bytes = hex::decode(out.proof.trim_start_matches("0x")).unwrap();
        let decoded = decode_signed(&bytes, true).unwrap();
        assert_eq!(decoded.issued_at, 1_000);
        assert_eq!(decoded.signature.to_hex(), out.signature);
    }

    #[tokio::test]
    async fn refuses_low_scores() {
        let svc = service_with(vec![MockProvider {
            source: Source::Gitcoin,
            result: || gitcoin(19),
        }]);
        let err = svc
            .verify_at(Source::Gitcoin, Address::derive("a"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::ScoreTooLow { score: 19, min_score: 20 }));
    }

    #[tokio::test]
    async fn capability_and_unconfigured_sources_are_unsupported() {
        let svc = service_with(vec![]);
        for source in [Source::Worldcoin, Source::Poh] {
            assert!(matches!(
                svc.verify_at(source, Address::derive("a"), 1).await,
                Err(OracleError::UnsupportedSource(_))
            ));
        }
        assert!(svc.enabled_sources().is_empty());
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let svc = service_with(vec![MockProvider {
            source: Source::BrightId,
            result: || Err(OracleError::UpstreamTimeout(Source::BrightId)),
        }]);
        assert!(matches!(
            svc.verify_at(Source::BrightId, Address::derive("a"), 1).await,
            Err(OracleError::UpstreamTimeout(Source::BrightId))
        ));
    }

    #[tokio::test]
    async fn unscored_sources_carry_no_score() {
        let svc = service_with(vec![MockProvider {
            source: Source::Poh,
            result: || {
                Ok(Evidence {
                    score: None,
                    provider_datum: "0xsubmission".into(),
                })
            },
        }]);
        let out = svc.verify_at(Source::Poh, Address::derive("a"), 5).await.unwrap();
        assert_eq!(out.score, None);
        assert_eq!(svc.enabled_sources(), vec![Source::Poh]);
    }
}
