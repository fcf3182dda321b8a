//! Call context: who is calling, and what time the ledger believes it is.
//!
//! Every state-changing entry point takes one. Time is explicit so tests
//! and replays are deterministic; [`CallContext::now`] reads the wall clock
//! for live callers.

use chrono::Utc;
use notabot_protocol::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    /// Unix seconds.
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }

    /// Context stamped with the current wall-clock time.
    pub fn now(caller: Address) -> Self {
        let ts = Utc::now().timestamp().max(0) as u64;
        Self::new(caller, ts)
    }

    /// Same time, different caller. Adapters use this to call the ledger
    /// under their own identity.
    pub fn as_caller(&self, caller: Address) -> Self {
        Self {
            caller,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_caller_keeps_time() {
        let ctx = CallContext::new(Address::derive("user"), 99);
        let adapter = ctx.as_caller(Address::derive("adapter"));
        assert_eq!(adapter.timestamp, 99);
        assert_eq!(adapter.caller, Address::derive("adapter"));
    }

    #[test]
    fn now_is_after_2020() {
        assert!(CallContext::now(Address::ZERO).timestamp > 1_577_836_800);
    }
}
