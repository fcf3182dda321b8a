//! # Aggregator Ledger
//!
//! Single source of truth for "who has been verified by what". Adapters
//! call [`Ledger::register_verification`] after validating a proof; the
//! ledger enforces that
//!
//! 1. the caller is the adapter configured for the source,
//! 2. the identity key has never been recorded, for any subject or source,
//! 3. the subject has no record for that source yet,
//!
//! and then records the verification, updates the source statistics,
//! mints `reward_per_source` tokens and (the first time) a badge.
//!
//! Per subject the lifecycle is `Unverified -> Verified(k)` where `k` is the
//! number of non-revoked records, plus an orthogonal `penalized` flag set
//! when an attack against one of its verifications is confirmed.
//!
//! Every method that mutates state either succeeds completely or leaves the
//! ledger untouched.

use notabot_protocol::config::PROBABILITY_SCALE;
use notabot_protocol::{Address, IdentityKey, Source};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::confidence::{self, penalize, Confidence, Probability};
use crate::context::CallContext;
use crate::error::ContractError;
use crate::events::Event;
use crate::nullifier::ConsumedKeys;
use crate::reward::{RewardToken, VerificationBadge};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Deployment-time parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub admin: Address,
    /// Address allowed to confirm attacks alongside the admin.
    pub oracle: Address,
    /// Tokens minted per accepted source, in base units.
    pub reward_per_source: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProfile {
    pub adapter: Option<Address>,
    pub min_score: u64,
    pub confidence: Confidence,
}

impl SourceProfile {
    fn default_for(source: Source) -> Self {
        Self {
            adapter: None,
            min_score: source.default_min_score(),
            confidence: Confidence::default_for(source),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatistics {
    pub total_verifications: u64,
    pub confirmed_attacks: u64,
    pub last_update: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub identity_key: IdentityKey,
    pub accepted_at: u64,
    pub quality_score: u64,
    /// One-way; set by attack confirmation.
    pub revoked: bool,
}

/// Reward-side view of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardState {
    pub balance: u128,
    pub has_badge: bool,
    pub penalized: bool,
}

/// What a successful registration produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub subject: Address,
    pub source: Source,
    pub identity_key: IdentityKey,
    pub reward_minted: u128,
    pub badge_minted: bool,
}

/// Outcome of [`Ledger::confirm_attack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub confidence: Confidence,
    pub record_revoked: bool,
    pub tokens_revoked: u128,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    address: Address,
    admin: Address,
    oracle: Address,
    reward_per_source: u128,
    profiles: BTreeMap<Source, SourceProfile>,
    stats: BTreeMap<Source, SourceStatistics>,
    adapters: HashMap<Address, Source>,
    records: HashMap<Address, BTreeMap<Source, VerificationRecord>>,
    consumed: ConsumedKeys,
    token: RewardToken,
    badge: VerificationBadge,
    penalized: HashSet<Address>,
    events: Vec<Event>,
}

impl Ledger {
    /// Caller identity the ledger uses toward its own credentials.
    pub fn default_address() -> Address {
        Address::derive("notabot.ledger")
    }

    pub fn new(config: LedgerConfig) -> Self {
        let address = Self::default_address();
        let profiles = Source::ALL
            .into_iter()
            .map(|s| (s, SourceProfile::default_for(s)))
            .collect();
        let stats = Source::ALL
            .into_iter()
            .map(|s| (s, SourceStatistics::default()))
            .collect();

        info!(
            admin = %config.admin,
            oracle = %config.oracle,
            reward_per_source = config.reward_per_source,
            "ledger deployed"
        );

        Self {
            address,
            admin: config.admin,
            oracle: config.oracle,
            reward_per_source: config.reward_per_source,
            profiles,
            stats,
            adapters: HashMap::new(),
            records: HashMap::new(),
            consumed: ConsumedKeys::new(),
            token: RewardToken::new(address),
            badge: VerificationBadge::new(address),
            penalized: HashSet::new(),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn oracle(&self) -> Address {
        self.oracle
    }

    pub fn reward_per_source(&self) -> u128 {
        self.reward_per_source
    }

    fn profile(&self, source: Source) -> SourceProfile {
        self.profiles
            .get(&source)
            .copied()
            .unwrap_or_else(|| SourceProfile::default_for(source))
    }

    fn ensure_admin(&self, ctx: &CallContext) -> Result<(), ContractError> {
        if ctx.caller != self.admin {
            warn!(caller = %ctx.caller, "rejected: caller is not admin");
            return Err(ContractError::UnauthorizedAdmin);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Record an accepted verification. Only the adapter configured for
    /// `source` may call this.
    pub fn register_verification(
        &mut self,
        ctx: &CallContext,
        subject: Address,
        source: Source,
        identity_key: IdentityKey,
        quality_score: u64,
    ) -> Result<RegistrationReceipt, ContractError> {
        if subject.is_zero() {
            return Err(ContractError::InvalidAddress);
        }
        if self.profile(source).adapter != Some(ctx.caller) {
            warn!(caller = %ctx.caller, %source, "rejected: unauthorized adapter");
            return Err(ContractError::UnauthorizedAdapter(source));
        }
        if self.consumed.contains(&identity_key) {
            warn!(%subject, %source, key = %identity_key, "rejected: duplicate identity key");
            return Err(ContractError::DuplicateVerification);
        }
        if self
            .records
            .get(&subject)
            .is_some_and(|r| r.contains_key(&source))
        {
            warn!(%subject, %source, "rejected: subject already verified for source");
            return Err(ContractError::AlreadyVerified(source));
        }

        // Badge authority is checked up front, so the token mint is the
        // last fallible step and runs before any other mutation.
        self.badge.ensure_minter(&self.address)?;
        self.token
            .mint(&self.address, subject, self.reward_per_source)?;

        self.consumed.insert_if_absent(identity_key);
        self.records.entry(subject).or_default().insert(
            source,
            VerificationRecord {
                identity_key,
                accepted_at: ctx.timestamp,
                quality_score,
                revoked: false,
            },
        );
        let stats = self.stats.entry(source).or_default();
        stats.total_verifications += 1;
        stats.last_update = ctx.timestamp;

        let badge_minted = self.badge.mint(&self.address, subject, ctx.timestamp)?;

        self.events.push(Event::VerificationRegistered {
            subject,
            source,
            identity_key,
            quality_score,
            timestamp: ctx.timestamp,
        });

        info!(
            %subject,
            %source,
            quality_score,
            badge_minted,
            verifications = self.get_verification_count(&subject),
            "verification registered"
        );

        Ok(RegistrationReceipt {
            subject,
            source,
            identity_key,
            reward_minted: self.reward_per_source,
            badge_minted,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn active_sources<'a>(&'a self, subject: &Address) -> impl Iterator<Item = Source> + 'a {
        self.records
            .get(subject)
            .into_iter()
            .flat_map(|r| r.iter())
            .filter(|(_, rec)| !rec.revoked)
            .map(|(source, _)| *source)
    }

    pub fn is_verified_human(&self, subject: &Address) -> bool {
        self.active_sources(subject).next().is_some()
    }

    pub fn get_verification_count(&self, subject: &Address) -> usize {
        self.active_sources(subject).count()
    }

    /// Sources with a non-revoked record for `subject`, in id order.
    pub fn verified_sources(&self, subject: &Address) -> Vec<Source> {
        self.active_sources(subject).collect()
    }

    /// `balance / reward_per_source`.
    pub fn get_trust_score(&self, subject: &Address) -> u128 {
        if self.reward_per_source == 0 {
            return 0;
        }
        self.token.balance_of(subject) / self.reward_per_source
    }

    /// `1 - Π(1 - p_i)` over the subject's non-revoked sources, with
    /// denominator `PROBABILITY_SCALE`.
    pub fn get_human_probability(&self, subject: &Address) -> Probability {
        let p = confidence::human_probability(
            self.active_sources(subject)
                .map(|s| self.profile(s).confidence),
        );
        debug!(%subject, probability = %p, scale = PROBABILITY_SCALE, "human probability");
        p
    }

    pub fn record(&self, subject: &Address, source: Source) -> Option<&VerificationRecord> {
        self.records.get(subject).and_then(|r| r.get(&source))
    }

    pub fn source_profile(&self, source: Source) -> SourceProfile {
        self.profile(source)
    }

    pub fn source_stats(&self, source: Source) -> SourceStatistics {
        self.stats.get(&source).copied().unwrap_or_default()
    }

    pub fn source_confidence(&self, source: Source) -> Confidence {
        self.profile(source).confidence
    }

    pub fn reward_state(&self, subject: &Address) -> RewardState {
        RewardState {
            balance: self.token.balance_of(subject),
            has_badge: self.badge.has_badge(subject),
            penalized: self.penalized.contains(subject),
        }
    }

    pub fn is_identity_key_used(&self, key: &IdentityKey) -> bool {
        self.consumed.contains(key)
    }

    pub fn token(&self) -> &RewardToken {
        &self.token
    }

    pub fn badge(&self) -> &VerificationBadge {
        &self.badge
    }

    /// Holder-initiated token transfer. The sender is `ctx.caller`.
    pub fn transfer_tokens(
        &mut self,
        ctx: &CallContext,
        to: Address,
        amount: u128,
    ) -> Result<(), ContractError> {
        self.token.transfer(&ctx.caller, to, amount)?;
        debug!(from = %ctx.caller, %to, amount, "tokens transferred");
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Authorize `adapter` as the registrar for `source`. Replaces any
    /// previous adapter for that source.
    pub fn add_adapter(
        &mut self,
        ctx: &CallContext,
        adapter: Address,
        source: Source,
    ) -> Result<(), ContractError> {
        self.ensure_admin(ctx)?;
        if adapter.is_zero() {
            return Err(ContractError::InvalidAddress);
        }

        if let Some(previous) = self.profile(source).adapter {
            if previous != adapter {
                self.adapters.remove(&previous);
                self.events.push(Event::AdapterRemoved {
                    adapter: previous,
                    source,
                });
            }
        }
        if let Some(old_source) = self.adapters.insert(adapter, source) {
            if old_source != source {
                if let Some(p) = self.profiles.get_mut(&old_source) {
                    p.adapter = None;
                }
            }
        }
        self.profiles
            .entry(source)
            .or_insert_with(|| SourceProfile::default_for(source))
            .adapter = Some(adapter);
        self.events.push(Event::AdapterAdded { adapter, source });

        info!(%adapter, %source, "adapter added");
        Ok(())
    }

    pub fn remove_adapter(&mut self, ctx: &CallContext, adapter: Address) -> Result<(), ContractError> {
        self.ensure_admin(ctx)?;
        let source = self
            .adapters
            .remove(&adapter)
            .ok_or(ContractError::UnknownAdapter)?;
        if let Some(p) = self.profiles.get_mut(&source) {
            p.adapter = None;
        }
        self.events.push(Event::AdapterRemoved { adapter, source });

        info!(%adapter, %source, "adapter removed");
        Ok(())
    }

    pub fn is_adapter(&self, address: &Address) -> bool {
        self.adapters.contains_key(address)
    }

    pub fn set_min_score(
        &mut self,
        ctx: &CallContext,
        source: Source,
        min_score: u64,
    ) -> Result<(), ContractError> {
        self.ensure_admin(ctx)?;
        self.profiles
            .entry(source)
            .or_insert_with(|| SourceProfile::default_for(source))
            .min_score = min_score;
        info!(%source, min_score, "minimum score updated");
        Ok(())
    }

    pub fn update_confidence(
        &mut self,
        ctx: &CallContext,
        source: Source,
        numerator: u64,
        denominator: u64,
    ) -> Result<(), ContractError> {
        self.ensure_admin(ctx)?;
        let confidence = Confidence::new(numerator, denominator)?;
        self.set_confidence(source, confidence);
        info!(%source, %confidence, "confidence updated");
        Ok(())
    }

    fn set_confidence(&mut self, source: Source, confidence: Confidence) {
        self.profiles
            .entry(source)
            .or_insert_with(|| SourceProfile::default_for(source))
            .confidence = confidence;
        self.events.push(Event::ConfidenceUpdated {
            source,
            numerator: confidence.numerator(),
            denominator: confidence.denominator(),
        });
    }

    /// Record a confirmed Sybil attack through `source` involving `subject`.
    ///
    /// The source's confidence is halved. If the subject holds an active
    /// record for the source it is revoked, up to `reward_per_source`
    /// tokens are burned, and the subject is flagged as penalized.
    pub fn confirm_attack(
        &mut self,
        ctx: &CallContext,
        source: Source,
        subject: Address,
    ) -> Result<AttackOutcome, ContractError> {
        if ctx.caller != self.admin && ctx.caller != self.oracle {
            warn!(caller = %ctx.caller, "rejected: attack confirmation by non-authority");
            return Err(ContractError::UnauthorizedAdmin);
        }

        let has_active = self
            .record(&subject, source)
            .is_some_and(|rec| !rec.revoked);
        let tokens_revoked = if has_active {
            self.token
                .burn_up_to(&self.address, &subject, self.reward_per_source)?
        } else {
            0
        };

        let stats = self.stats.entry(source).or_default();
        stats.confirmed_attacks += 1;
        stats.last_update = ctx.timestamp;
        let confirmed_attacks = stats.confirmed_attacks;

        let confidence = penalize(self.profile(source).confidence);
        self.events.push(Event::AttackConfirmed {
            source,
            subject,
            confirmed_attacks,
        });
        self.set_confidence(source, confidence);

        if has_active {
            if let Some(rec) = self.records.get_mut(&subject).and_then(|r| r.get_mut(&source)) {
                rec.revoked = true;
            }
            self.penalized.insert(subject);
            self.events.push(Event::TokensRevoked {
                subject,
                amount: tokens_revoked,
            });
        }

        warn!(
            %source,
            %subject,
            confirmed_attacks,
            %confidence,
            tokens_revoked,
            "attack confirmed"
        );

        Ok(AttackOutcome {
            confidence,
            record_revoked: has_active,
            tokens_revoked,
        })
    }

    /// Flag suspicious activity for off-line review. No state besides the
    /// event log changes.
    pub fn report_anomaly(
        &mut self,
        ctx: &CallContext,
        subject: Address,
        reason: impl Into<String>,
    ) -> Result<(), ContractError> {
        let caller = ctx.caller;
        if caller != self.admin && caller != self.oracle && !self.is_adapter(&caller) {
            return Err(ContractError::UnauthorizedAdmin);
        }
        let reason = reason.into();
        warn!(%subject, reporter = %caller, %reason, "anomaly reported");
        self.events.push(Event::AnomalyDetected {
            subject,
            reporter: caller,
            reason,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
