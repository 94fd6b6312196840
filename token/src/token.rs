//! Balances, supply cap, mint authority and vote delegation.

use crate::checkpoints::Checkpoints;
use crate::error::TokenError;
use dao_types::{AccountId, Timestamp, DECIMALS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The capped governance token.
///
/// Every mutation takes `now` and must not go back in time relative to the
/// previous mutation; vote and supply checkpoints are recorded at `now`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceToken {
    symbol: String,
    max_supply: u128,
    total_supply: u128,
    minter: Option<AccountId>,
    balances: HashMap<AccountId, u128>,
    /// Holder → checkpointed balance.
    balance_history: HashMap<AccountId, Checkpoints>,
    /// Holder → the account its voting power is delegated to.
    delegates: HashMap<AccountId, AccountId>,
    /// Delegate → checkpointed vote weight.
    votes: HashMap<AccountId, Checkpoints>,
    supply_history: Checkpoints,
    last_write: Timestamp,
}

impl GovernanceToken {
    pub fn new(symbol: impl Into<String>, max_supply: u128) -> Self {
        Self {
            symbol: symbol.into(),
            max_supply,
            total_supply: 0,
            minter: None,
            balances: HashMap::new(),
            balance_history: HashMap::new(),
            delegates: HashMap::new(),
            votes: HashMap::new(),
            supply_history: Checkpoints::new(),
            last_write: Timestamp::EPOCH,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u32 {
        DECIMALS
    }

    pub fn max_supply(&self) -> u128 {
        self.max_supply
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Tokens that can still be minted before the cap is reached.
    pub fn mintable(&self) -> u128 {
        self.max_supply.saturating_sub(self.total_supply)
    }

    pub fn minter(&self) -> Option<&AccountId> {
        self.minter.as_ref()
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Appoint the only account allowed to mint. Can be done once.
    pub fn set_minter(&mut self, minter: AccountId) -> Result<(), TokenError> {
        if self.minter.is_some() {
            return Err(TokenError::MinterAlreadySet);
        }
        tracing::info!(minter = %minter, symbol = %self.symbol, "token minter set");
        self.minter = Some(minter);
        Ok(())
    }

    /// Check a mint without applying it.
    pub fn check_mint(&self, caller: &AccountId, amount: u128) -> Result<(), TokenError> {
        if self.minter.as_ref() != Some(caller) {
            return Err(TokenError::Unauthorized(caller.to_string()));
        }
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }
        let available = self.mintable();
        if amount > available {
            return Err(TokenError::SupplyCapExceeded {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    /// Create `amount` new tokens for `to`.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), TokenError> {
        self.check_time(now)?;
        self.check_mint(caller, amount)?;

        self.last_write = now;
        self.total_supply += amount;
        self.supply_history.record(now, self.total_supply);
        self.credit(to, amount, now);
        let delegate = self.delegates.get(to).cloned();
        self.move_votes(None, delegate.as_ref(), amount, now);

        tracing::debug!(to = %to, amount, total_supply = self.total_supply, "minted");
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), TokenError> {
        self.check_time(now)?;
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }

        self.last_write = now;
        self.set_balance(from, available - amount, now);
        self.credit(to, amount, now);
        let src = self.delegates.get(from).cloned();
        let dst = self.delegates.get(to).cloned();
        self.move_votes(src.as_ref(), dst.as_ref(), amount, now);

        tracing::debug!(from = %from, to = %to, amount, "transferred");
        Ok(())
    }

    /// Direct `account`'s voting power to `delegatee` (which may be `account` itself).
    pub fn delegate(
        &mut self,
        account: &AccountId,
        delegatee: &AccountId,
        now: Timestamp,
    ) -> Result<(), TokenError> {
        self.check_time(now)?;
        self.last_write = now;
        let previous = self.delegates.insert(account.clone(), delegatee.clone());
        let weight = self.balance_of(account);
        self.move_votes(previous.as_ref(), Some(delegatee), weight, now);

        tracing::info!(account = %account, delegatee = %delegatee, weight, "delegate changed");
        Ok(())
    }

    /// Make `account` its own delegate if it has never delegated.
    ///
    /// Returns whether a delegation was recorded.
    pub fn auto_delegate(&mut self, account: &AccountId, now: Timestamp) -> Result<bool, TokenError> {
        if self.delegates.contains_key(account) {
            return Ok(false);
        }
        self.delegate(account, account, now)?;
        Ok(true)
    }

    pub fn delegates(&self, account: &AccountId) -> Option<&AccountId> {
        self.delegates.get(account)
    }

    /// Current voting power of `account`.
    pub fn votes(&self, account: &AccountId) -> u128 {
        self.votes.get(account).map(|c| c.latest()).unwrap_or(0)
    }

    /// Voting power of `account` as of `at`.
    pub fn past_votes(&self, account: &AccountId, at: Timestamp) -> u128 {
        self.votes.get(account).map(|c| c.value_at(at)).unwrap_or(0)
    }

    /// Balance of `account` as of `at`.
    pub fn past_balance_of(&self, account: &AccountId, at: Timestamp) -> u128 {
        self.balance_history
            .get(account)
            .map(|c| c.value_at(at))
            .unwrap_or(0)
    }

    /// Total supply as of `at`.
    pub fn past_total_supply(&self, at: Timestamp) -> u128 {
        self.supply_history.value_at(at)
    }

    /// Serialize the token state for persistence.
    pub fn save_state(&self) -> Result<Vec<u8>, TokenError> {
        bincode::serialize(self).map_err(|e| TokenError::Decode(e.to_string()))
    }

    /// Restore token state from bytes produced by [`GovernanceToken::save_state`].
    pub fn load_state(data: &[u8]) -> Result<Self, TokenError> {
        bincode::deserialize(data).map_err(|e| TokenError::Decode(e.to_string()))
    }

    fn check_time(&self, now: Timestamp) -> Result<(), TokenError> {
        if now < self.last_write {
            return Err(TokenError::CheckpointOutOfOrder {
                at: now.as_secs(),
                latest: self.last_write.as_secs(),
            });
        }
        Ok(())
    }

    /// Balances never exceed total supply, so the addition cannot overflow.
    fn credit(&mut self, account: &AccountId, amount: u128, now: Timestamp) {
        let balance = self.balance_of(account).saturating_add(amount);
        self.set_balance(account, balance, now);
    }

    fn set_balance(&mut self, account: &AccountId, balance: u128, now: Timestamp) {
        self.balances.insert(account.clone(), balance);
        self.balance_history
            .entry(account.clone())
            .or_default()
            .record(now, balance);
    }

    /// Shift `amount` of vote weight between delegates.
    ///
    /// Total vote weight never exceeds total supply, which never exceeds the
    /// cap, so the additions cannot overflow.
    fn move_votes(
        &mut self,
        src: Option<&AccountId>,
        dst: Option<&AccountId>,
        amount: u128,
        now: Timestamp,
    ) {
        if src == dst || amount == 0 {
            return;
        }
        if let Some(src) = src {
            let history = self.votes.entry(src.clone()).or_default();
            let value = history.latest().saturating_sub(amount);
            history.record(now, value);
        }
        if let Some(dst) = dst {
            let history = self.votes.entry(dst.clone()).or_default();
            let value = history.latest().saturating_add(amount);
            history.record(now, value);
        }
    }
}
