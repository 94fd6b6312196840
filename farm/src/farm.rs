//! The farm facade. Every operation settles accrual before it changes a stake.

use crate::accrual::AccrualEngine;
use crate::error::FarmError;
use crate::ledger::{AccountRecord, GlobalStakeState, StakeLedger, StakePosition};
use crate::schedule::{RewardPeriod, RewardSchedule};
use crate::sink::{Payout, RewardSink};
use dao_store::{FarmStore, StoreError};
use dao_types::{AccountId, AssetId, Timestamp};
use serde::de::DeserializeOwned;
use serde::Serialize;

const META_ASSETS: &[u8] = b"assets";
const META_POOLS: &[u8] = b"pools";
const META_ACCOUNTS: &[u8] = b"accounts";
const META_ACCRUAL: &[u8] = b"accrual";
const META_SCHEDULE: &[u8] = b"schedule";
const META_TOTAL_CLAIMED: &[u8] = b"total_claimed";

/// Outcome of an operation that pays out rewards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakeReceipt {
    /// Governance token units paid to the account.
    pub reward: u128,
    /// LP units returned to the account.
    pub withdrawn: u128,
    /// Whether this payout made the account its own delegate.
    pub auto_delegated: bool,
}

/// Time-weighted reward distribution over a set of LP assets.
///
/// All operations take `now` explicitly and reject a `now` earlier than the
/// last accrual update. Errors are returned before any observable state change.
pub struct Farm<S: RewardSink> {
    ledger: StakeLedger,
    accrual: AccrualEngine,
    schedule: Option<RewardSchedule>,
    sink: S,
    /// Reward paid out over the farm's lifetime.
    total_claimed: u128,
}

impl<S: RewardSink> Farm<S> {
    pub fn new(sink: S) -> Self {
        Self {
            ledger: StakeLedger::new(),
            accrual: AccrualEngine::new(),
            schedule: None,
            sink,
            total_claimed: 0,
        }
    }

    // ── Administration ─────────────────────────────────────────────────

    pub fn add_asset(&mut self, asset: AssetId, now: Timestamp) -> Result<(), FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.add_asset(asset.clone(), now)?;
        tracing::info!(asset = %asset, "asset supported");
        Ok(())
    }

    pub fn add_assets(&mut self, assets: &[AssetId], now: Timestamp) -> Result<(), FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.add_assets(assets, now)?;
        tracing::info!(count = assets.len(), "assets supported");
        Ok(())
    }

    /// Install the reward schedule. Can be done once.
    ///
    /// Emission dated before the last accrual update is not distributed.
    pub fn add_reward_periods(&mut self, schedule: RewardSchedule, now: Timestamp) -> Result<(), FarmError> {
        if self.schedule.is_some() {
            return Err(FarmError::ScheduleAlreadySet);
        }
        self.accrual.check_clock(now)?;
        if let Some(last) = self.accrual.last_update() {
            let missed = schedule.emitted_until(last);
            if missed > 0 {
                tracing::warn!(missed, "reward periods start before the last accrual update");
                self.accrual.forfeit(missed)?;
            }
        }
        tracing::info!(
            periods = schedule.len(),
            total_reward = schedule.total_reward(),
            start = schedule.start().as_secs(),
            end = schedule.end().as_secs(),
            "reward periods added"
        );
        self.schedule = Some(schedule);
        Ok(())
    }

    // ── Staking ────────────────────────────────────────────────────────

    /// Deposit LP without staking it.
    pub fn deposit(&mut self, account: &AccountId, asset: &AssetId, amount: u128, now: Timestamp) -> Result<(), FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.check_deposit(account, asset, amount)?;

        self.settle(account, asset, now)?;
        self.ledger.deposit(account, asset, amount)?;
        tracing::info!(account = %account, asset = %asset, amount, "deposited");
        Ok(())
    }

    /// Take idle LP back out of the farm.
    pub fn withdraw(&mut self, account: &AccountId, asset: &AssetId, amount: u128, now: Timestamp) -> Result<(), FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.withdraw(account, asset, amount)?;
        tracing::info!(account = %account, asset = %asset, amount, "withdrawn");
        Ok(())
    }

    /// Stake previously deposited LP.
    pub fn start_stake(&mut self, account: &AccountId, asset: &AssetId, amount: u128, now: Timestamp) -> Result<(), FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.check_start_stake(account, asset, amount)?;

        self.settle(account, asset, now)?;
        self.ledger.start_stake(account, asset, amount, now)?;
        self.warn_if_exhausted(now);
        tracing::info!(
            account = %account,
            asset = %asset,
            amount,
            total_staked = self.ledger.total_staked(),
            "stake started"
        );
        Ok(())
    }

    /// Deposit LP and stake it in one step.
    pub fn deposit_and_start_stake(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.check_stake(asset, amount)?;

        self.settle(account, asset, now)?;
        self.ledger.stake(account, asset, amount, now)?;
        self.warn_if_exhausted(now);
        tracing::info!(
            account = %account,
            asset = %asset,
            amount,
            total_staked = self.ledger.total_staked(),
            "staked"
        );
        Ok(())
    }

    /// Same as [`Farm::deposit_and_start_stake`].
    pub fn stake(&mut self, account: &AccountId, asset: &AssetId, amount: u128, now: Timestamp) -> Result<(), FarmError> {
        self.deposit_and_start_stake(account, asset, amount, now)
    }

    /// Unstake `amount` (it stays deposited) and pay every reward the account has
    /// accrued across all assets.
    pub fn end_stake(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
        now: Timestamp,
    ) -> Result<StakeReceipt, FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.check_end_stake(account, asset, amount)?;

        self.settle_account(account, now)?;
        let (reward, auto_delegated) = self.pay_accrued(account, now)?;
        self.ledger.end_stake(account, asset, amount, now)?;
        tracing::info!(
            account = %account,
            asset = %asset,
            amount,
            reward,
            total_staked = self.ledger.total_staked(),
            "stake ended"
        );
        Ok(StakeReceipt {
            reward,
            withdrawn: 0,
            auto_delegated,
        })
    }

    /// [`Farm::end_stake`] followed by withdrawing the unstaked LP.
    pub fn end_stake_and_withdraw(
        &mut self,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
        now: Timestamp,
    ) -> Result<StakeReceipt, FarmError> {
        self.accrual.check_clock(now)?;
        self.ledger.check_unstake(account, asset, amount)?;

        self.settle_account(account, now)?;
        let (reward, auto_delegated) = self.pay_accrued(account, now)?;
        self.ledger.unstake(account, asset, amount, now)?;
        tracing::info!(
            account = %account,
            asset = %asset,
            amount,
            reward,
            total_staked = self.ledger.total_staked(),
            "stake ended and withdrawn"
        );
        Ok(StakeReceipt {
            reward,
            withdrawn: amount,
            auto_delegated,
        })
    }

    /// Pay accrued reward without touching any stake.
    pub fn claim_reward(&mut self, account: &AccountId, now: Timestamp) -> Result<StakeReceipt, FarmError> {
        self.accrual.check_clock(now)?;
        self.settle_account(account, now)?;
        let (reward, auto_delegated) = self.pay_accrued(account, now)?;
        if reward > 0 {
            tracing::info!(account = %account, reward, "reward claimed");
        }
        Ok(StakeReceipt {
            reward,
            withdrawn: 0,
            auto_delegated,
        })
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Reward the account could claim at `now`, across all its assets.
    ///
    /// A pure projection: nothing is settled or stored.
    pub fn claimable_reward(&self, account: &AccountId, now: Timestamp) -> Result<u128, FarmError> {
        let reward_per_unit = self.accrual.projected_reward_per_unit(
            self.schedule.as_ref(),
            self.ledger.total_staked(),
            now,
        )?;
        self.ledger
            .positions_of(account)
            .into_iter()
            .try_fold(0u128, |total, position| {
                let pending = self.accrual.pending(position, reward_per_unit)?;
                total
                    .checked_add(position.accrued_unclaimed)
                    .and_then(|t| t.checked_add(pending))
                    .ok_or(FarmError::Overflow)
            })
    }

    pub fn staked_balance(&self, account: &AccountId, asset: &AssetId) -> u128 {
        self.ledger.staked_balance(account, asset)
    }

    pub fn unstaked_balance(&self, account: &AccountId, asset: &AssetId) -> u128 {
        self.ledger.unstaked_balance(account, asset)
    }

    pub fn total_staked(&self, asset: &AssetId) -> u128 {
        self.ledger.asset_total_staked(asset)
    }

    pub fn farm_total_staked(&self) -> u128 {
        self.ledger.total_staked()
    }

    pub fn position(&self, account: &AccountId, asset: &AssetId) -> Option<&StakePosition> {
        self.ledger.position(account, asset)
    }

    pub fn reward_periods(&self) -> &[RewardPeriod] {
        self.schedule.as_ref().map(|s| s.periods()).unwrap_or(&[])
    }

    pub fn reward_periods_count(&self) -> usize {
        self.reward_periods().len()
    }

    pub fn schedule(&self) -> Option<&RewardSchedule> {
        self.schedule.as_ref()
    }

    pub fn assets(&self) -> &[AssetId] {
        self.ledger.assets()
    }

    /// Reward paid to all accounts so far.
    pub fn total_claimed(&self) -> u128 {
        self.total_claimed
    }

    pub fn claimed_by(&self, account: &AccountId) -> u128 {
        self.ledger
            .account(account)
            .map(|r| r.total_claimed)
            .unwrap_or(0)
    }

    pub fn ledger(&self) -> &StakeLedger {
        &self.ledger
    }

    pub fn accrual(&self) -> &AccrualEngine {
        &self.accrual
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Write the farm state to a store. The sink persists itself.
    pub fn save_to_store(&self, store: &dyn FarmStore) -> Result<(), FarmError> {
        let assets = self.ledger.assets().to_vec();
        let pools: Vec<GlobalStakeState> = self.ledger.pools().into_iter().cloned().collect();
        let accounts: Vec<(AccountId, AccountRecord)> = self
            .ledger
            .accounts()
            .map(|(a, r)| (a.clone(), r.clone()))
            .collect();

        store.put_meta(META_ASSETS, &encode(&assets)?)?;
        store.put_meta(META_POOLS, &encode(&pools)?)?;
        store.put_meta(META_ACCOUNTS, &encode(&accounts)?)?;
        store.put_meta(META_ACCRUAL, &encode(&self.accrual)?)?;
        store.put_meta(META_SCHEDULE, &encode(&self.schedule)?)?;
        store.put_meta(META_TOTAL_CLAIMED, &self.total_claimed.to_be_bytes())?;

        for position in self.ledger.positions() {
            let key = (position.account.clone(), position.asset.clone());
            store.put_position(&key, &encode(position)?)?;
        }
        tracing::debug!(positions = self.ledger.positions().count(), "farm saved");
        Ok(())
    }

    /// Restore a farm saved with [`Farm::save_to_store`]. Missing entries read as empty.
    pub fn load_from_store(store: &dyn FarmStore, sink: S) -> Result<Self, FarmError> {
        let assets: Vec<AssetId> = load_meta(store, META_ASSETS)?.unwrap_or_default();
        let pools: Vec<GlobalStakeState> = load_meta(store, META_POOLS)?.unwrap_or_default();
        let accounts: Vec<(AccountId, AccountRecord)> =
            load_meta(store, META_ACCOUNTS)?.unwrap_or_default();
        let accrual: AccrualEngine = load_meta(store, META_ACCRUAL)?.unwrap_or_default();
        let schedule: Option<RewardSchedule> = load_meta::<Option<RewardSchedule>>(store, META_SCHEDULE)?.flatten();
        let total_claimed = match store.get_meta(META_TOTAL_CLAIMED)? {
            Some(bytes) => {
                let raw: [u8; 16] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Corruption(format!("total_claimed has {} bytes", bytes.len()))
                })?;
                u128::from_be_bytes(raw)
            }
            None => 0,
        };

        let mut positions = Vec::new();
        for (_, bytes) in store.iter_positions()? {
            positions.push(decode::<StakePosition>(&bytes)?);
        }
        let ledger = StakeLedger::restore(assets, pools, accounts, positions)?;
        tracing::debug!(positions = ledger.positions().count(), "farm loaded");
        Ok(Self {
            ledger,
            accrual,
            schedule,
            sink,
            total_claimed,
        })
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Bring the accumulator to `now` and settle one position, opening it if needed.
    fn settle(&mut self, account: &AccountId, asset: &AssetId, now: Timestamp) -> Result<(), FarmError> {
        let reward_per_unit =
            self.accrual
                .update(self.schedule.as_ref(), self.ledger.total_staked(), now)?;
        let position = self
            .ledger
            .open_position(account, asset, reward_per_unit, now)?;
        self.accrual.settle(position, now)?;
        Ok(())
    }

    /// Bring the accumulator to `now` and settle every position of the account.
    fn settle_account(&mut self, account: &AccountId, now: Timestamp) -> Result<(), FarmError> {
        self.accrual
            .update(self.schedule.as_ref(), self.ledger.total_staked(), now)?;
        let assets: Vec<AssetId> = self
            .ledger
            .account(account)
            .map(|r| r.assets.iter().cloned().collect())
            .unwrap_or_default();
        for asset in &assets {
            if let Some(position) = self.ledger.position_mut(account, asset) {
                self.accrual.settle(position, now)?;
            }
        }
        Ok(())
    }

    /// Pay everything settled for the account through the sink.
    ///
    /// Returns the amount paid and whether the payout auto-delegated. Nothing
    /// changes when the sink refuses.
    fn pay_accrued(&mut self, account: &AccountId, now: Timestamp) -> Result<(u128, bool), FarmError> {
        let positions = self.ledger.positions_of(account);
        let reward = positions.iter().try_fold(0u128, |total, p| {
            total
                .checked_add(p.accrued_unclaimed)
                .ok_or(FarmError::Overflow)
        })?;
        if reward == 0 {
            return Ok((0, false));
        }
        let assets: Vec<AssetId> = positions.iter().map(|p| p.asset.clone()).collect();

        let record = self.ledger.account(account).cloned().unwrap_or_default();
        let account_claimed = record
            .total_claimed
            .checked_add(reward)
            .ok_or(FarmError::Overflow)?;
        let farm_claimed = self
            .total_claimed
            .checked_add(reward)
            .ok_or(FarmError::Overflow)?;
        let auto_delegate = !record.auto_delegated;

        self.sink.pay_reward(&Payout {
            to: account.clone(),
            amount: reward,
            auto_delegate,
            at: now,
        })?;

        for asset in &assets {
            if let Some(position) = self.ledger.position_mut(account, asset) {
                position.accrued_unclaimed = 0;
            }
        }
        if let Some(record) = self.ledger.account_mut(account) {
            record.total_claimed = account_claimed;
            record.auto_delegated = true;
        }
        self.total_claimed = farm_claimed;
        if auto_delegate {
            tracing::info!(account = %account, "auto-delegated on first payout");
        }
        Ok((reward, auto_delegate))
    }

    fn warn_if_exhausted(&self, now: Timestamp) {
        if let Some(Err(e)) = self.schedule.as_ref().map(|s| s.ensure_active(now)) {
            tracing::warn!(error = %e, at = now.as_secs(), "staking after the last reward period");
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, FarmError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()).into())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FarmError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()).into())
}

fn load_meta<T: DeserializeOwned>(store: &dyn FarmStore, key: &[u8]) -> Result<Option<T>, FarmError> {
    store.get_meta(key)?.map(|bytes| decode(&bytes)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records payouts; refuses them while `fail` is set.
    #[derive(Default)]
    struct RecordingSink {
        payouts: Vec<Payout>,
        fail: bool,
    }

    impl RewardSink for RecordingSink {
        fn pay_reward(&mut self, payout: &Payout) -> Result<(), FarmError> {
            if self.fail {
                return Err(FarmError::Config("sink offline".into()));
            }
            self.payouts.push(payout.clone());
            Ok(())
        }
    }

    fn account(n: u64) -> AccountId {
        AccountId::new(format!("0x{:040x}", n))
    }

    fn asset(n: u64) -> AssetId {
        AssetId::new(format!("0x{:040x}", 0xa000 + n))
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    /// One period `[0, 1000)` paying 1000 units, so one unit per second.
    fn farm() -> Farm<RecordingSink> {
        let mut farm = Farm::new(RecordingSink::default());
        farm.add_assets(&[asset(1), asset(2)], ts(0)).unwrap();
        let schedule = RewardSchedule::new(vec![RewardPeriod {
            start: ts(0),
            end: ts(1000),
            reward: 1000,
        }])
        .unwrap();
        farm.add_reward_periods(schedule, ts(0)).unwrap();
        farm
    }

    #[test]
    fn single_staker_earns_emission() {
        let mut farm = farm();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(100)).unwrap();
        assert_eq!(farm.claimable_reward(&alice, ts(300)).unwrap(), 200);

        let receipt = farm.end_stake_and_withdraw(&alice, &asset(1), 10, ts(300)).unwrap();
        assert_eq!(receipt, StakeReceipt { reward: 200, withdrawn: 10, auto_delegated: true });
        assert_eq!(farm.staked_balance(&alice, &asset(1)), 0);
        assert_eq!(farm.unstaked_balance(&alice, &asset(1)), 0);
        assert_eq!(farm.claimed_by(&alice), 200);
        assert_eq!(farm.total_claimed(), 200);
        assert_eq!(farm.claimable_reward(&alice, ts(500)).unwrap(), 0);
    }

    #[test]
    fn auto_delegate_is_requested_only_once() {
        let mut farm = farm();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(0)).unwrap();
        assert!(farm.claim_reward(&alice, ts(10)).unwrap().auto_delegated);
        assert!(!farm.claim_reward(&alice, ts(20)).unwrap().auto_delegated);
        let flags: Vec<bool> = farm.sink().payouts.iter().map(|p| p.auto_delegate).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn zero_reward_makes_no_payout() {
        let mut farm = farm();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(50)).unwrap();
        let receipt = farm.end_stake(&alice, &asset(1), 10, ts(50)).unwrap();
        assert_eq!(receipt.reward, 0);
        assert!(!receipt.auto_delegated);
        assert!(farm.sink().payouts.is_empty());
        assert_eq!(farm.unstaked_balance(&alice, &asset(1)), 10);
    }

    #[test]
    fn stake_weight_is_shared_across_assets() {
        let mut farm = farm();
        let (alice, bob) = (account(1), account(2));
        farm.stake(&alice, &asset(1), 30, ts(0)).unwrap();
        farm.stake(&bob, &asset(2), 10, ts(0)).unwrap();
        assert_eq!(farm.claimable_reward(&alice, ts(400)).unwrap(), 300);
        assert_eq!(farm.claimable_reward(&bob, ts(400)).unwrap(), 100);
        assert_eq!(farm.farm_total_staked(), 40);
        assert_eq!(farm.total_staked(&asset(1)), 30);
    }

    #[test]
    fn end_stake_claims_every_asset() {
        let mut farm = farm();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(0)).unwrap();
        farm.stake(&alice, &asset(2), 10, ts(0)).unwrap();
        let receipt = farm.end_stake(&alice, &asset(1), 10, ts(100)).unwrap();
        assert_eq!(receipt.reward, 100);
        assert_eq!(farm.staked_balance(&alice, &asset(2)), 10);
        // the remaining stake keeps earning everything alone
        assert_eq!(farm.claimable_reward(&alice, ts(200)).unwrap(), 100);
    }

    #[test]
    fn failed_payout_leaves_state_untouched() {
        let mut farm = farm();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(0)).unwrap();
        farm.sink_mut().fail = true;
        assert!(farm.end_stake_and_withdraw(&alice, &asset(1), 10, ts(100)).is_err());
        assert_eq!(farm.staked_balance(&alice, &asset(1)), 10);
        assert_eq!(farm.claimable_reward(&alice, ts(100)).unwrap(), 100);
        assert_eq!(farm.total_claimed(), 0);

        farm.sink_mut().fail = false;
        let receipt = farm.end_stake_and_withdraw(&alice, &asset(1), 10, ts(100)).unwrap();
        assert_eq!(receipt.reward, 100);
        assert!(receipt.auto_delegated);
    }

    #[test]
    fn overflowing_operations_pay_nothing_and_open_nothing() {
        let mut farm = farm();
        let (alice, bob) = (account(1), account(2));
        farm.deposit(&alice, &asset(1), u128::MAX - 5, ts(0)).unwrap();
        farm.stake(&alice, &asset(1), 10, ts(0)).unwrap();

        assert!(matches!(farm.end_stake(&alice, &asset(1), 10, ts(100)), Err(FarmError::Overflow)));
        assert!(farm.sink().payouts.is_empty());
        assert_eq!(farm.total_claimed(), 0);
        assert_eq!(farm.staked_balance(&alice, &asset(1)), 10);
        assert_eq!(farm.claimable_reward(&alice, ts(100)).unwrap(), 100);

        assert!(matches!(farm.deposit(&alice, &asset(1), 6, ts(100)), Err(FarmError::Overflow)));
        assert!(matches!(
            farm.stake(&bob, &asset(1), u128::MAX - 5, ts(100)),
            Err(FarmError::Overflow)
        ));
        assert!(farm.position(&bob, &asset(1)).is_none());
        assert!(farm.ledger().account(&bob).is_none());

        // ending part of the stake still fits
        let receipt = farm.end_stake(&alice, &asset(1), 5, ts(100)).unwrap();
        assert_eq!(receipt.reward, 100);
    }

    #[test]
    fn invalid_operations_are_rejected() {
        let mut farm = farm();
        let alice = account(1);
        assert!(matches!(farm.stake(&alice, &asset(1), 0, ts(0)), Err(FarmError::ZeroAmount)));
        assert!(matches!(
            farm.stake(&alice, &asset(7), 1, ts(0)),
            Err(FarmError::UnsupportedAsset(_))
        ));
        farm.stake(&alice, &asset(1), 5, ts(10)).unwrap();
        assert!(matches!(
            farm.end_stake(&alice, &asset(1), 6, ts(20)),
            Err(FarmError::InsufficientStake { requested: 6, staked: 5 })
        ));
        assert!(matches!(
            farm.stake(&alice, &asset(1), 1, ts(5)),
            Err(FarmError::ClockWentBackwards { now: 5, last_update: 10 })
        ));
        assert!(matches!(
            farm.withdraw(&alice, &asset(1), 1, ts(20)),
            Err(FarmError::InsufficientBalance { requested: 1, available: 0 })
        ));
        let again = RewardSchedule::new(vec![RewardPeriod { start: ts(0), end: ts(1), reward: 1 }]).unwrap();
        assert!(matches!(farm.add_reward_periods(again, ts(20)), Err(FarmError::ScheduleAlreadySet)));
    }

    #[test]
    fn deposit_only_earns_once_staked() {
        let mut farm = farm();
        let alice = account(1);
        farm.deposit(&alice, &asset(1), 50, ts(0)).unwrap();
        assert_eq!(farm.claimable_reward(&alice, ts(100)).unwrap(), 0);
        farm.start_stake(&alice, &asset(1), 50, ts(100)).unwrap();
        assert_eq!(farm.claimable_reward(&alice, ts(250)).unwrap(), 150);
        assert!(matches!(
            farm.start_stake(&alice, &asset(1), 1, ts(250)),
            Err(FarmError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn claimable_reward_does_not_mutate() {
        let mut farm = farm();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(0)).unwrap();
        let before = farm.accrual().clone();
        let first = farm.claimable_reward(&alice, ts(500)).unwrap();
        let second = farm.claimable_reward(&alice, ts(500)).unwrap();
        assert_eq!(first, second);
        assert_eq!(farm.accrual(), &before);
        assert!(farm.claimable_reward(&alice, ts(600)).unwrap() >= first);
    }

    #[test]
    fn accrual_stops_after_schedule_end() {
        let mut farm = farm();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(0)).unwrap();
        assert_eq!(farm.claimable_reward(&alice, ts(1000)).unwrap(), 1000);
        assert_eq!(farm.claimable_reward(&alice, ts(5000)).unwrap(), 1000);
        // staking after exhaustion is allowed but earns nothing
        farm.stake(&account(2), &asset(1), 10, ts(2000)).unwrap();
        assert_eq!(farm.claimable_reward(&account(2), ts(3000)).unwrap(), 0);
    }

    #[test]
    fn late_schedule_forfeits_past_emission() {
        let mut farm = Farm::new(RecordingSink::default());
        farm.add_asset(asset(1), ts(0)).unwrap();
        let alice = account(1);
        farm.stake(&alice, &asset(1), 10, ts(100)).unwrap();
        let schedule = RewardSchedule::new(vec![RewardPeriod { start: ts(0), end: ts(1000), reward: 1000 }]).unwrap();
        farm.add_reward_periods(schedule, ts(100)).unwrap();
        assert_eq!(farm.accrual().unallocated(), 100);
        assert_eq!(farm.claimable_reward(&alice, ts(200)).unwrap(), 100);
    }
}
