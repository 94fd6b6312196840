//! Stake positions, per-asset totals and the supported-asset registry.
//!
//! The ledger only moves balances. Reward settlement happens in the accrual
//! engine, and the farm settles a position before asking the ledger to change it.

use crate::error::FarmError;
use dao_types::{AccountId, AssetId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One account's holding of one LP asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    pub account: AccountId,
    pub asset: AssetId,
    /// LP units currently earning rewards.
    pub staked: u128,
    /// LP units deposited in the farm but not staked.
    pub unstaked: u128,
    /// Farm reward-per-unit at the last settlement.
    pub reward_per_unit_paid: u128,
    pub last_checkpoint: Timestamp,
    /// Settled reward not yet paid out.
    pub accrued_unclaimed: u128,
    /// Fraction of a reward unit left over by the last settlement, scaled by
    /// `ACC_PRECISION`. Carried into the next one.
    pub reward_remainder: u128,
}

impl StakePosition {
    pub fn new(account: AccountId, asset: AssetId, reward_per_unit: u128, now: Timestamp) -> Self {
        Self {
            account,
            asset,
            staked: 0,
            unstaked: 0,
            reward_per_unit_paid: reward_per_unit,
            last_checkpoint: now,
            accrued_unclaimed: 0,
            reward_remainder: 0,
        }
    }

    /// Staked plus idle LP units held by the farm for this position.
    pub fn deposited(&self) -> u128 {
        self.staked.saturating_add(self.unstaked)
    }
}

/// Totals for one supported LP asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStakeState {
    pub asset: AssetId,
    pub total_staked: u128,
    pub last_update_time: Timestamp,
}

/// Per-account bookkeeping across assets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Assets this account has a position in.
    pub assets: BTreeSet<AssetId>,
    /// Set on the first nonzero payout, when the account is made its own delegate.
    pub auto_delegated: bool,
    pub total_claimed: u128,
}

#[derive(Clone, Debug, Default)]
pub struct StakeLedger {
    /// Supported assets in registration order.
    assets: Vec<AssetId>,
    pools: HashMap<AssetId, GlobalStakeState>,
    positions: HashMap<(AccountId, AssetId), StakePosition>,
    accounts: HashMap<AccountId, AccountRecord>,
    /// Sum of `total_staked` over every asset.
    total_staked: u128,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted parts. The farm-wide total is recomputed
    /// from the per-asset totals.
    pub fn restore(
        assets: Vec<AssetId>,
        pools: Vec<GlobalStakeState>,
        accounts: Vec<(AccountId, AccountRecord)>,
        positions: Vec<StakePosition>,
    ) -> Result<Self, FarmError> {
        let mut total_staked: u128 = 0;
        for pool in &pools {
            total_staked = total_staked
                .checked_add(pool.total_staked)
                .ok_or(FarmError::Overflow)?;
        }
        Ok(Self {
            assets,
            pools: pools.into_iter().map(|p| (p.asset.clone(), p)).collect(),
            positions: positions
                .into_iter()
                .map(|p| ((p.account.clone(), p.asset.clone()), p))
                .collect(),
            accounts: accounts.into_iter().collect(),
            total_staked,
        })
    }

    // ── Asset registry ─────────────────────────────────────────────────

    pub fn add_asset(&mut self, asset: AssetId, now: Timestamp) -> Result<(), FarmError> {
        if self.is_supported(&asset) {
            return Err(FarmError::AssetAlreadySupported(asset.to_string()));
        }
        self.pools.insert(
            asset.clone(),
            GlobalStakeState {
                asset: asset.clone(),
                total_staked: 0,
                last_update_time: now,
            },
        );
        self.assets.push(asset);
        Ok(())
    }

    /// Register several assets; nothing is registered if any is a duplicate.
    pub fn add_assets(&mut self, assets: &[AssetId], now: Timestamp) -> Result<(), FarmError> {
        let mut seen = BTreeSet::new();
        for asset in assets {
            if self.is_supported(asset) || !seen.insert(asset) {
                return Err(FarmError::AssetAlreadySupported(asset.to_string()));
            }
        }
        for asset in assets {
            self.add_asset(asset.clone(), now)?;
        }
        Ok(())
    }

    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    pub fn is_supported(&self, asset: &AssetId) -> bool {
        self.pools.contains_key(asset)
    }

    pub fn ensure_supported(&self, asset: &AssetId) -> Result<(), FarmError> {
        if self.is_supported(asset) {
            Ok(())
        } else {
            Err(FarmError::UnsupportedAsset(asset.to_string()))
        }
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn position(&self, account: &AccountId, asset: &AssetId) -> Option<&StakePosition> {
        self.positions.get(&(account.clone(), asset.clone()))
    }

    pub fn position_mut(&mut self, account: &AccountId, asset: &AssetId) -> Option<&mut StakePosition> {
        self.positions.get_mut(&(account.clone(), asset.clone()))
    }

    pub fn positions(&self) -> impl Iterator<Item = &StakePosition> {
        self.positions.values()
    }

    /// The account's positions, ordered by asset.
    pub fn positions_of<'a>(&'a self, account: &AccountId) -> Vec<&'a StakePosition> {
        self.accounts
            .get(account)
            .map(|record| {
                record
                    .assets
                    .iter()
                    .filter_map(|asset| self.position(account, asset))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn staked_balance(&self, account: &AccountId, asset: &AssetId) -> u128 {
        self.position(account, asset).map(|p| p.staked).unwrap_or(0)
    }

    pub fn unstaked_balance(&self, account: &AccountId, asset: &AssetId) -> u128 {
        self.position(account, asset).map(|p| p.unstaked).unwrap_or(0)
    }

    pub fn pool(&self, asset: &AssetId) -> Option<&GlobalStakeState> {
        self.pools.get(asset)
    }

    /// Pools in registration order.
    pub fn pools(&self) -> Vec<&GlobalStakeState> {
        self.assets.iter().filter_map(|a| self.pools.get(a)).collect()
    }

    pub fn asset_total_staked(&self, asset: &AssetId) -> u128 {
        self.pools.get(asset).map(|p| p.total_staked).unwrap_or(0)
    }

    /// Stake summed across every asset; the denominator of reward sharing.
    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    pub fn account(&self, account: &AccountId) -> Option<&AccountRecord> {
        self.accounts.get(account)
    }

    pub fn account_mut(&mut self, account: &AccountId) -> Option<&mut AccountRecord> {
        self.accounts.get_mut(account)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &AccountRecord)> {
        self.accounts.iter()
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Get the position, creating it with `reward_per_unit` as its paid
    /// checkpoint if the account never held this asset.
    pub fn open_position(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        reward_per_unit: u128,
        now: Timestamp,
    ) -> Result<&mut StakePosition, FarmError> {
        self.ensure_supported(asset)?;
        self.accounts
            .entry(account.clone())
            .or_default()
            .assets
            .insert(asset.clone());
        Ok(self
            .positions
            .entry((account.clone(), asset.clone()))
            .or_insert_with(|| {
                StakePosition::new(account.clone(), asset.clone(), reward_per_unit, now)
            }))
    }

    /// Add newly deposited LP straight to the staked balance.
    pub fn stake(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), FarmError> {
        let (pool_total, farm_total) = self.check_stake(asset, amount)?;
        let position = self.existing_position_mut(account, asset)?;
        let staked = position
            .staked
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        position.staked = staked;
        self.commit_totals(asset, pool_total, farm_total, now);
        Ok(())
    }

    /// Remove LP from the staked balance and from the farm.
    pub fn unstake(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), FarmError> {
        let (pool_total, farm_total) = self.check_unstake(account, asset, amount)?;
        if let Some(position) = self.position_mut(account, asset) {
            position.staked -= amount;
        }
        self.commit_totals(asset, pool_total, farm_total, now);
        Ok(())
    }

    /// Add LP to the idle balance.
    pub fn deposit(&mut self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        self.check_deposit(account, asset, amount)?;
        let position = self.existing_position_mut(account, asset)?;
        position.unstaked = position
            .unstaked
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        Ok(())
    }

    /// Take LP out of the idle balance.
    pub fn withdraw(&mut self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        self.check_withdraw(account, asset, amount)?;
        if let Some(position) = self.position_mut(account, asset) {
            position.unstaked -= amount;
        }
        Ok(())
    }

    /// Move LP from the idle balance to the staked balance.
    pub fn start_stake(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), FarmError> {
        self.check_withdraw(account, asset, amount)?;
        let (pool_total, farm_total) = self.check_stake(asset, amount)?;
        let position = self.existing_position_mut(account, asset)?;
        let staked = position
            .staked
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        position.unstaked -= amount;
        position.staked = staked;
        self.commit_totals(asset, pool_total, farm_total, now);
        Ok(())
    }

    /// Move LP from the staked balance back to the idle balance.
    pub fn end_stake(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), FarmError> {
        let (pool_total, farm_total) = self.check_end_stake(account, asset, amount)?;
        let position = self.existing_position_mut(account, asset)?;
        let unstaked = position
            .unstaked
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        position.staked -= amount;
        position.unstaked = unstaked;
        self.commit_totals(asset, pool_total, farm_total, now);
        Ok(())
    }

    // ── Validation ─────────────────────────────────────────────────────

    /// Check that `amount` can leave the staked balance. Returns the asset and
    /// farm totals after the change.
    pub fn check_unstake(
        &self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(u128, u128), FarmError> {
        check_amount(amount)?;
        self.ensure_supported(asset)?;
        let staked = self.staked_balance(account, asset);
        if amount > staked {
            return Err(FarmError::InsufficientStake {
                requested: amount,
                staked,
            });
        }
        // Totals always include every position's stake.
        Ok((
            self.asset_total_staked(asset).saturating_sub(amount),
            self.total_staked.saturating_sub(amount),
        ))
    }

    /// Check that `amount` can leave the idle balance.
    pub fn check_withdraw(&self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        check_amount(amount)?;
        self.ensure_supported(asset)?;
        let available = self.unstaked_balance(account, asset);
        if amount > available {
            return Err(FarmError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    /// Check that `amount` can be added to the idle balance.
    pub fn check_deposit(&self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        check_amount(amount)?;
        self.ensure_supported(asset)?;
        self.unstaked_balance(account, asset)
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        Ok(())
    }

    /// Check that idle LP can move to the staked balance. Returns the asset
    /// and farm totals after the change.
    pub fn check_start_stake(
        &self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(u128, u128), FarmError> {
        self.check_withdraw(account, asset, amount)?;
        self.check_stake(asset, amount)
    }

    /// Check that staked LP can move back to the idle balance. Returns the
    /// asset and farm totals after the change.
    pub fn check_end_stake(
        &self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(u128, u128), FarmError> {
        let totals = self.check_unstake(account, asset, amount)?;
        self.unstaked_balance(account, asset)
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        Ok(totals)
    }

    /// Check that `amount` more can be staked in `asset`. A position's stake
    /// never exceeds its asset total, so the position cannot overflow either.
    /// Returns the asset and farm totals after the change.
    pub fn check_stake(&self, asset: &AssetId, amount: u128) -> Result<(u128, u128), FarmError> {
        check_amount(amount)?;
        self.ensure_supported(asset)?;
        let pool_total = self
            .asset_total_staked(asset)
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        let farm_total = self
            .total_staked
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        Ok((pool_total, farm_total))
    }

    fn existing_position_mut(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
    ) -> Result<&mut StakePosition, FarmError> {
        self.positions
            .get_mut(&(account.clone(), asset.clone()))
            .ok_or_else(|| FarmError::NoPosition {
                account: account.to_string(),
                asset: asset.to_string(),
            })
    }

    fn commit_totals(&mut self, asset: &AssetId, pool_total: u128, farm_total: u128, now: Timestamp) {
        if let Some(pool) = self.pools.get_mut(asset) {
            pool.total_staked = pool_total;
            pool.last_update_time = now;
        }
        self.total_staked = farm_total;
    }
}

fn check_amount(amount: u128) -> Result<(), FarmError> {
    if amount == 0 {
        Err(FarmError::ZeroAmount)
    } else {
        Ok(())
    }
}
