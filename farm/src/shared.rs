//! Serialized access to one farm from many tasks.
//!
//! Every mutation holds the write lock for the whole settle → mutate → pay
//! transition, and reads `now` from the clock only after the lock is held, so
//! operations observe a non-decreasing clock in lock order. Queries take the
//! read lock and see a consistent snapshot.

use crate::error::FarmError;
use crate::farm::{Farm, StakeReceipt};
use crate::sink::RewardSink;
use dao_types::{AccountId, AssetId, Clock};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct SharedFarm<S: RewardSink> {
    inner: Arc<RwLock<Farm<S>>>,
    clock: Arc<dyn Clock>,
}

impl<S: RewardSink> Clone for SharedFarm<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: RewardSink> SharedFarm<S> {
    pub fn new(farm: Farm<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(farm)),
            clock,
        }
    }

    pub async fn deposit(&self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        let mut farm = self.inner.write().await;
        farm.deposit(account, asset, amount, self.clock.now())
    }

    pub async fn withdraw(&self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        let mut farm = self.inner.write().await;
        farm.withdraw(account, asset, amount, self.clock.now())
    }

    pub async fn start_stake(&self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        let mut farm = self.inner.write().await;
        farm.start_stake(account, asset, amount, self.clock.now())
    }

    pub async fn stake(&self, account: &AccountId, asset: &AssetId, amount: u128) -> Result<(), FarmError> {
        let mut farm = self.inner.write().await;
        farm.deposit_and_start_stake(account, asset, amount, self.clock.now())
    }

    pub async fn end_stake(
        &self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<StakeReceipt, FarmError> {
        let mut farm = self.inner.write().await;
        farm.end_stake(account, asset, amount, self.clock.now())
    }

    pub async fn end_stake_and_withdraw(
        &self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<StakeReceipt, FarmError> {
        let mut farm = self.inner.write().await;
        farm.end_stake_and_withdraw(account, asset, amount, self.clock.now())
    }

    pub async fn claim_reward(&self, account: &AccountId) -> Result<StakeReceipt, FarmError> {
        let mut farm = self.inner.write().await;
        farm.claim_reward(account, self.clock.now())
    }

    pub async fn claimable_reward(&self, account: &AccountId) -> Result<u128, FarmError> {
        let farm = self.inner.read().await;
        farm.claimable_reward(account, self.clock.now())
    }

    pub async fn staked_balance(&self, account: &AccountId, asset: &AssetId) -> u128 {
        self.inner.read().await.staked_balance(account, asset)
    }

    /// Hold the read lock for several queries against one snapshot.
    pub async fn read(&self) -> RwLockReadGuard<'_, Farm<S>> {
        self.inner.read().await
    }

    /// Hold the write lock, e.g. to administer assets or the schedule.
    pub async fn write(&self) -> RwLockWriteGuard<'_, Farm<S>> {
        self.inner.write().await
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
