//! Replay set: identity keys (or nullifier hashes) that have been consumed.
//!
//! Adapters keep one each, the ledger keeps a global one. Insertion is
//! check-and-mark in a single call, so there is no gap between "not seen"
//! and "seen" for a caller holding `&mut`.

use notabot_protocol::IdentityKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumedKeys {
    keys: HashSet<IdentityKey>,
}

impl ConsumedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` consumed. `false` if it already was.
    pub fn insert_if_absent(&mut self, key: IdentityKey) -> bool {
        self.keys.insert(key)
    }

    /// Undo a mark. Only used to roll back a registration the ledger
    /// refused in the same call.
    pub fn remove(&mut self, key: &IdentityKey) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_once() {
        let mut set = ConsumedKeys::new();
        let k = IdentityKey::from_bytes([7; 32]);
        assert!(set.insert_if_absent(k));
        assert!(!set.insert_if_absent(k));
        assert!(set.contains(&k));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_allows_reinsert() {
        let mut set = ConsumedKeys::new();
        let k = IdentityKey::from_bytes([7; 32]);
        set.insert_if_absent(k);
        assert!(set.remove(&k));
        assert!(!set.remove(&k));
        assert!(set.insert_if_absent(k));
    }
}
