//! # Deployment Runtime
//!
//! A ledger plus its installed adapters behind one lock. Every
//! state-changing call takes the lock for its whole duration, so calls are
//! totally ordered and the replay check-and-mark of two concurrent
//! submissions can never interleave.
//!
//! `Deployment` is `Send + Sync`; share it with `Arc`.

use notabot_protocol::{Address, Source};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::info;

use crate::adapter::{SourceAdapter, VerificationAccepted};
use crate::confidence::Probability;
use crate::context::CallContext;
use crate::error::ContractError;
use crate::events::Event;
use crate::ledger::{AttackOutcome, Ledger, LedgerConfig, RewardState};

struct State {
    ledger: Ledger,
    adapters: HashMap<Source, Box<dyn SourceAdapter>>,
}

pub struct Deployment {
    state: Mutex<State>,
}

impl Deployment {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            state: Mutex::new(State {
                ledger: Ledger::new(config),
                adapters: HashMap::new(),
            }),
        }
    }

    /// Install `adapter` for its source and authorize it on the ledger.
    /// `ctx.caller` must be the ledger admin.
    pub fn install_adapter(
        &self,
        ctx: &CallContext,
        adapter: Box<dyn SourceAdapter>,
    ) -> Result<(), ContractError> {
        let mut state = self.state.lock();
        let source = adapter.source();
        state.ledger.add_adapter(ctx, adapter.address(), source)?;
        info!(%source, adapter = %adapter.address(), "adapter installed");
        state.adapters.insert(source, adapter);
        Ok(())
    }

    /// Route a proof to the adapter installed for `source`.
    pub fn submit(
        &self,
        ctx: &CallContext,
        source: Source,
        subject: Address,
        proof: &[u8],
    ) -> Result<VerificationAccepted, ContractError> {
        let mut guard = self.state.lock();
        let State { ledger, adapters } = &mut *guard;
        let adapter = adapters
            .get_mut(&source)
            .ok_or(ContractError::AdapterNotInstalled(source))?;
        adapter.verify_and_register(ledger, ctx, subject, proof)
    }

    pub fn confirm_attack(
        &self,
        ctx: &CallContext,
        source: Source,
        subject: Address,
    ) -> Result<AttackOutcome, ContractError> {
        self.state.lock().ledger.confirm_attack(ctx, source, subject)
    }

    pub fn is_verified_human(&self, subject: &Address) -> bool {
        self.state.lock().ledger.is_verified_human(subject)
    }

    pub fn get_verification_count(&self, subject: &Address) -> usize {
        self.state.lock().ledger.get_verification_count(subject)
    }

    pub fn get_trust_score(&self, subject: &Address) -> u128 {
        self.state.lock().ledger.get_trust_score(subject)
    }

    pub fn get_human_probability(&self, subject: &Address) -> Probability {
        self.state.lock().ledger.get_human_probability(subject)
    }

    pub fn reward_state(&self, subject: &Address) -> RewardState {
        self.state.lock().ledger.reward_state(subject)
    }

    /// Ledger events followed by every adapter's events, in source order.
    pub fn events(&self) -> Vec<Event> {
        let state = self.state.lock();
        let mut out = state.ledger.events().to_vec();
        for source in Source::ALL {
            if let Some(adapter) = state.adapters.get(&source) {
                out.extend_from_slice(adapter.events());
            }
        }
        out
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.state.lock().ledger)
    }
}
