//! Reward-per-unit accumulator and position settlement.
//!
//! The accumulator is the integral over time of `emission_rate / total_staked`,
//! scaled by [`ACC_PRECISION`]. A position that held `staked` units between two
//! settlements earned `staked × Δreward_per_unit / ACC_PRECISION`.
//!
//! Both divisions keep their remainder and fold it into the next one, so the
//! flooring never compounds across updates. Emission is fully accounted for as
//! settled reward, projected reward, unallocated emission, or the one carried
//! remainder awaiting the next update.

use crate::error::FarmError;
use crate::ledger::StakePosition;
use crate::schedule::RewardSchedule;
use dao_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Fixed-point scale of the reward-per-unit accumulator.
///
/// The accumulator reaches at most `max_supply × ACC_PRECISION` (one raw LP
/// unit staked for the whole schedule), which must fit in a `u128`.
pub const ACC_PRECISION: u128 = 1_000_000_000_000;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualEngine {
    reward_per_unit: u128,
    /// `None` until the first update; emission is then counted from the schedule start.
    last_update: Option<Timestamp>,
    /// Emission that can never be paid: intervals with nothing staked, and
    /// remainders stranded once the schedule is over.
    unallocated: u128,
    /// `emitted × ACC_PRECISION` left over by the last division by the total
    /// stake. Always below the total stake it was divided by.
    carry: u128,
}

/// Accumulator state an update would produce.
struct Advance {
    reward_per_unit: u128,
    carry: u128,
}

impl AccrualEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reward_per_unit(&self) -> u128 {
        self.reward_per_unit
    }

    pub fn last_update(&self) -> Option<Timestamp> {
        self.last_update
    }

    pub fn unallocated(&self) -> u128 {
        self.unallocated
    }

    /// Emission held back by the last update, in whole reward units.
    pub fn carried_reward(&self) -> u128 {
        self.carry / ACC_PRECISION
    }

    /// Reject a `now` that precedes the last update.
    pub fn check_clock(&self, now: Timestamp) -> Result<(), FarmError> {
        match self.last_update {
            Some(last) if now < last => Err(FarmError::ClockWentBackwards {
                now: now.as_secs(),
                last_update: last.as_secs(),
            }),
            _ => Ok(()),
        }
    }

    /// The accumulator value an update at `now` would produce, without mutating.
    pub fn projected_reward_per_unit(
        &self,
        schedule: Option<&RewardSchedule>,
        total_staked: u128,
        now: Timestamp,
    ) -> Result<u128, FarmError> {
        let emitted = self.emitted_since_update(schedule, now)?;
        Ok(self.advance(emitted, total_staked)?.reward_per_unit)
    }

    /// Bring the accumulator up to `now`. Returns the new reward-per-unit.
    pub fn update(
        &mut self,
        schedule: Option<&RewardSchedule>,
        total_staked: u128,
        now: Timestamp,
    ) -> Result<u128, FarmError> {
        let emitted = self.emitted_since_update(schedule, now)?;
        let Advance {
            reward_per_unit,
            mut carry,
        } = self.advance(emitted, total_staked)?;
        let mut unallocated = self.unallocated;
        if total_staked == 0 {
            unallocated = unallocated.checked_add(emitted).ok_or(FarmError::Overflow)?;
        }
        // Nothing more will be emitted to push the carry over the total stake.
        if schedule.is_some_and(|s| now >= s.end()) && carry >= ACC_PRECISION {
            unallocated = unallocated
                .checked_add(carry / ACC_PRECISION)
                .ok_or(FarmError::Overflow)?;
            carry %= ACC_PRECISION;
        }

        self.reward_per_unit = reward_per_unit;
        self.carry = carry;
        self.unallocated = unallocated;
        self.last_update = Some(now);

        if emitted > 0 {
            tracing::debug!(
                emitted,
                total_staked,
                reward_per_unit,
                at = now.as_secs(),
                "accrual updated"
            );
        }
        Ok(reward_per_unit)
    }

    /// Count `amount` of emission as never distributable.
    pub fn forfeit(&mut self, amount: u128) -> Result<(), FarmError> {
        self.unallocated = self
            .unallocated
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        Ok(())
    }

    /// Reward earned by `position` since its last settlement, at `reward_per_unit`.
    pub fn pending(&self, position: &StakePosition, reward_per_unit: u128) -> Result<u128, FarmError> {
        Ok(Self::earned(position, reward_per_unit)? / ACC_PRECISION)
    }

    /// Fold pending reward into `accrued_unclaimed` and move the position's
    /// checkpoint to the current accumulator. Returns the accrued total.
    ///
    /// Settling twice at the same instant is a no-op.
    pub fn settle(&self, position: &mut StakePosition, now: Timestamp) -> Result<u128, FarmError> {
        let earned = Self::earned(position, self.reward_per_unit)?;
        let accrued = position
            .accrued_unclaimed
            .checked_add(earned / ACC_PRECISION)
            .ok_or(FarmError::Overflow)?;
        position.accrued_unclaimed = accrued;
        position.reward_remainder = earned % ACC_PRECISION;
        position.reward_per_unit_paid = self.reward_per_unit;
        position.last_checkpoint = now;
        Ok(accrued)
    }

    /// Scaled reward since the last settlement, including its carried fraction.
    fn earned(position: &StakePosition, reward_per_unit: u128) -> Result<u128, FarmError> {
        let delta = reward_per_unit.saturating_sub(position.reward_per_unit_paid);
        position
            .staked
            .checked_mul(delta)
            .and_then(|v| v.checked_add(position.reward_remainder))
            .ok_or(FarmError::Overflow)
    }

    fn emitted_since_update(
        &self,
        schedule: Option<&RewardSchedule>,
        now: Timestamp,
    ) -> Result<u128, FarmError> {
        self.check_clock(now)?;
        let Some(schedule) = schedule else {
            return Ok(0);
        };
        let from = self.last_update.unwrap_or_else(|| schedule.start());
        Ok(schedule.emitted_between(from, now))
    }

    fn advance(&self, emitted: u128, total_staked: u128) -> Result<Advance, FarmError> {
        if total_staked == 0 {
            return Ok(Advance {
                reward_per_unit: self.reward_per_unit,
                carry: self.carry,
            });
        }
        let scaled = emitted
            .checked_mul(ACC_PRECISION)
            .and_then(|v| v.checked_add(self.carry))
            .ok_or(FarmError::Overflow)?;
        let reward_per_unit = self
            .reward_per_unit
            .checked_add(scaled / total_staked)
            .ok_or(FarmError::Overflow)?;
        Ok(Advance {
            reward_per_unit,
            carry: scaled % total_staked,
        })
    }
}
