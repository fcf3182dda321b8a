//! # Reward Credentials
//!
//! Two credentials are issued on verification:
//!
//! - **RewardToken** — fungible. The ledger mints `REWARD_PER_SOURCE` per
//!   newly accepted source and burns it back on confirmed attacks. Holders
//!   may transfer freely; a subject's trust score is derived from its
//!   balance, so transferring tokens transfers apparent trust, exactly as
//!   with any fungible reward.
//! - **VerificationBadge** — non-transferable marker that a subject has been
//!   verified at least once. Minted once per subject, never moved.
//!
//! ## Security Model
//!
//! - **Mint gating**: only the configured minter (the ledger's own address)
//!   may mint or burn.
//! - **Supply tracking**: total supply and balances change together, with
//!   checked arithmetic on every step.

use notabot_protocol::config::REWARD_DECIMALS;
use notabot_protocol::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ContractError;

// ---------------------------------------------------------------------------
// RewardToken
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardToken {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    minter: Address,
    total_supply: u128,
    balances: HashMap<Address, u128>,
}

impl RewardToken {
    pub fn new(minter: Address) -> Self {
        Self {
            name: "NotABot Verification Token".into(),
            symbol: "NAB".into(),
            decimals: REWARD_DECIMALS,
            minter,
            total_supply: 0,
            balances: HashMap::new(),
        }
    }

    fn ensure_minter(&self, caller: &Address) -> Result<(), ContractError> {
        if *caller != self.minter {
            return Err(ContractError::UnauthorizedMinter);
        }
        Ok(())
    }

    /// Mint `amount` to `to`. Nothing changes on error.
    pub fn mint(&mut self, caller: &Address, to: Address, amount: u128) -> Result<(), ContractError> {
        self.ensure_minter(caller)?;
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(ContractError::BalanceOverflow)?;
        let new_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(ContractError::BalanceOverflow)?;

        self.total_supply = new_supply;
        self.balances.insert(to, new_balance);
        Ok(())
    }

    /// Burn exactly `amount` from `from`.
    pub fn burn(&mut self, caller: &Address, from: &Address, amount: u128) -> Result<(), ContractError> {
        self.ensure_minter(caller)?;
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(ContractError::InsufficientBalance { balance, amount });
        }
        self.balances.insert(*from, balance - amount);
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }

    /// Burn `min(balance, max_amount)` and return what was burned. The
    /// subject may have moved tokens away; revocation takes what is left.
    pub fn burn_up_to(
        &mut self,
        caller: &Address,
        from: &Address,
        max_amount: u128,
    ) -> Result<u128, ContractError> {
        let amount = self.balance_of(from).min(max_amount);
        self.burn(caller, from, amount)?;
        Ok(amount)
    }

    pub fn transfer(&mut self, from: &Address, to: Address, amount: u128) -> Result<(), ContractError> {
        if to.is_zero() {
            return Err(ContractError::InvalidAddress);
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(ContractError::InsufficientBalance {
                balance: from_balance,
                amount,
            });
        }
        if *from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(ContractError::BalanceOverflow)?;

        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(to, to_balance);
        Ok(())
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }
}

// ---------------------------------------------------------------------------
// VerificationBadge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationBadge {
    minter: Address,
    /// holder -> timestamp the badge was minted.
    holders: HashMap<Address, u64>,
}

impl VerificationBadge {
    pub fn new(minter: Address) -> Self {
        Self {
            minter,
            holders: HashMap::new(),
        }
    }

    /// Mint a badge if `to` doesn't hold one. Returns whether one was minted.
    pub fn ensure_minter(&self, caller: &Address) -> Result<(), ContractError> {
        if *caller != self.minter {
            return Err(ContractError::UnauthorizedMinter);
        }
        Ok(())
    }

    /// Mint a badge to `to`. `Ok(false)` if it already holds one. Only an
    /// unauthorized caller is an error.
    pub fn mint(&mut self, caller: &Address, to: Address, timestamp: u64) -> Result<bool, ContractError> {
        self.ensure_minter(caller)?;
        if self.holders.contains_key(&to) {
            return Ok(false);
        }
        self.holders.insert(to, timestamp);
        Ok(true)
    }

    pub fn has_badge(&self, holder: &Address) -> bool {
        self.holders.contains_key(holder)
    }

    pub fn minted_at(&self, holder: &Address) -> Option<u64> {
        self.holders.get(holder).copied()
    }

    pub fn total_minted(&self) -> usize {
        self.holders.len()
    }

    /// Badges are soulbound.
    pub fn transfer(&mut self, _from: &Address, _to: Address) -> Result<(), ContractError> {
        Err(ContractError::TransferNotAllowed)
    }
}
