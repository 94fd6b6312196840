//! Distribution intervals and dividend claims.

use crate::error::DivsError;
use crate::interval::DistributionInterval;
use crate::sink::FeeSink;
use dao_token::GovernanceToken;
use dao_types::{AccountId, Timestamp, SECS_PER_DAY};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Length of a distribution interval unless configured otherwise.
pub const DEFAULT_PAYMENT_INTERVAL_SECS: u64 = 30 * SECS_PER_DAY;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct DivsState {
    payment_interval_secs: u64,
    intervals: Vec<DistributionInterval>,
    /// (interval id, holder) → amount paid.
    claimed: HashMap<(u64, AccountId), u128>,
    /// Fees held: not yet distributed plus unclaimed.
    funds: u128,
}

/// Pays collected fees to governance token holders.
///
/// Shares are read from the token's balance checkpoints, so the distributor
/// only needs the token at query and claim time.
pub struct DivsDistributor<S: FeeSink> {
    state: DivsState,
    sink: S,
}

impl<S: FeeSink> DivsDistributor<S> {
    pub fn new(payment_interval_secs: u64, sink: S) -> Result<Self, DivsError> {
        if payment_interval_secs == 0 {
            return Err(DivsError::InvalidPaymentInterval);
        }
        Ok(Self {
            state: DivsState {
                payment_interval_secs,
                ..DivsState::default()
            },
            sink,
        })
    }

    pub fn payment_interval_secs(&self) -> u64 {
        self.state.payment_interval_secs
    }

    pub fn funds(&self) -> u128 {
        self.state.funds
    }

    pub fn intervals(&self) -> &[DistributionInterval] {
        &self.state.intervals
    }

    pub fn intervals_count(&self) -> usize {
        self.state.intervals.len()
    }

    /// The latest interval, if it is still running at `now`.
    pub fn current_interval(&self, now: Timestamp) -> Option<&DistributionInterval> {
        self.state
            .intervals
            .last()
            .filter(|interval| interval.is_active(now))
    }

    pub fn claimed_divs(&self, interval_id: u64, account: &AccountId) -> u128 {
        self.state
            .claimed
            .get(&(interval_id, account.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Take in fees to be distributed from the next interval on.
    pub fn deposit_fees(&mut self, amount: u128) -> Result<(), DivsError> {
        if amount == 0 {
            return Err(DivsError::ZeroAmount);
        }
        self.state.funds = self
            .state
            .funds
            .checked_add(amount)
            .ok_or(DivsError::Overflow)?;
        tracing::debug!(amount, funds = self.state.funds, "fees deposited");
        Ok(())
    }

    pub fn can_create_new_interval(&self, now: Timestamp) -> bool {
        self.check_new_interval(now).is_ok()
    }

    /// Open an interval at `now` that distributes every fee held.
    pub fn add_distribution_interval(&mut self, now: Timestamp) -> Result<&DistributionInterval, DivsError> {
        self.check_new_interval(now)?;
        let interval = DistributionInterval {
            id: self.state.intervals.len() as u64 + 1,
            reward: self.state.funds,
            from: now,
            to: now.plus_secs(self.state.payment_interval_secs),
            paid: 0,
        };
        tracing::info!(
            id = interval.id,
            reward = interval.reward,
            from = interval.from.as_secs(),
            to = interval.to.as_secs(),
            "distribution interval added"
        );
        self.state.intervals.push(interval);
        Ok(&self.state.intervals[self.state.intervals.len() - 1])
    }

    /// Dividends `account` can claim at `now` from the running interval.
    ///
    /// `reward × balance / supply`, both read at the interval's snapshot. Zero
    /// outside an interval, after a claim, or when there was no supply.
    pub fn claimable_divs(
        &self,
        token: &GovernanceToken,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, DivsError> {
        let Some(interval) = self.current_interval(now) else {
            return Ok(0);
        };
        if self.state.claimed.contains_key(&(interval.id, account.clone())) {
            return Ok(0);
        }
        let supply = token.past_total_supply(interval.snapshot());
        if supply == 0 {
            return Ok(0);
        }
        let balance = token.past_balance_of(account, interval.snapshot());
        let share = BigUint::from(interval.reward) * BigUint::from(balance) / BigUint::from(supply);
        u128::try_from(share).map_err(|_| DivsError::Overflow)
    }

    /// Pay `account` its dividends for the running interval. Returns the amount
    /// paid; a zero share pays nothing and leaves the account free to claim.
    pub fn claim_divs(
        &mut self,
        token: &GovernanceToken,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, DivsError> {
        let amount = self.claimable_divs(token, account, now)?;
        if amount == 0 {
            return Ok(0);
        }
        // a nonzero share means the latest interval is running
        let index = self.state.intervals.len() - 1;
        let interval = &self.state.intervals[index];
        // shares sum to at most the reward, which the held funds cover
        let paid = interval
            .paid
            .checked_add(amount)
            .filter(|paid| *paid <= interval.reward)
            .ok_or(DivsError::Overflow)?;
        let funds = self
            .state
            .funds
            .checked_sub(amount)
            .ok_or(DivsError::Overflow)?;
        let id = interval.id;

        self.sink.pay_fees(account, amount, now)?;

        self.state.intervals[index].paid = paid;
        self.state.funds = funds;
        self.state.claimed.insert((id, account.clone()), amount);
        tracing::info!(account = %account, interval = id, amount, "dividends claimed");
        Ok(amount)
    }

    /// Serialize the distributor state. The sink persists itself.
    pub fn save_state(&self) -> Result<Vec<u8>, DivsError> {
        bincode::serialize(&self.state).map_err(|e| DivsError::Decode(e.to_string()))
    }

    /// Restore a distributor saved with [`DivsDistributor::save_state`].
    pub fn load_state(data: &[u8], sink: S) -> Result<Self, DivsError> {
        let state: DivsState =
            bincode::deserialize(data).map_err(|e| DivsError::Decode(e.to_string()))?;
        Ok(Self { state, sink })
    }

    fn check_new_interval(&self, now: Timestamp) -> Result<(), DivsError> {
        if let Some(last) = self.state.intervals.last() {
            if !last.has_ended(now) {
                return Err(DivsError::IntervalRunning {
                    id: last.id,
                    ends_at: last.to.as_secs(),
                });
            }
        }
        if self.state.funds == 0 {
            return Err(DivsError::NoFunds);
        }
        Ok(())
    }
}
