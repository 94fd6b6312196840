//! Reward periods and the cumulative emission curve.

use crate::error::FarmError;
use crate::math::mul_div_floor;
use dao_types::{Timestamp, TokenAmount};
use dao_utils::format_duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-duration interval with a pre-allocated reward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPeriod {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Raw token units emitted linearly over `[start, end)`.
    pub reward: u128,
}

impl RewardPeriod {
    pub fn duration_secs(&self) -> u64 {
        self.end.as_secs().saturating_sub(self.start.as_secs())
    }

    /// Seconds of this period that fall inside `[from, to]`.
    pub fn overlap_secs(&self, from: Timestamp, to: Timestamp) -> u64 {
        let lo = from.max(self.start);
        let hi = to.min(self.end);
        hi.as_secs().saturating_sub(lo.as_secs())
    }

    /// Reward emitted by this period from its start up to `t` (floor).
    pub fn emitted_until(&self, t: Timestamp) -> u128 {
        let elapsed = self.overlap_secs(self.start, t);
        if elapsed >= self.duration_secs() {
            return self.reward;
        }
        mul_div_floor(self.reward, elapsed, self.duration_secs()).unwrap_or(0)
    }
}

impl fmt::Display for RewardPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} ({}) reward {}",
            self.start,
            self.end,
            format_duration(self.duration_secs()),
            TokenAmount::new(self.reward)
        )
    }
}

/// A period intersecting a queried interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodOverlap {
    pub index: usize,
    pub period: RewardPeriod,
    pub overlap_secs: u64,
}

impl PeriodOverlap {
    /// Fraction of the period covered by the overlap, in `[0, 1]`.
    pub fn elapsed_fraction(&self) -> f64 {
        self.overlap_secs as f64 / self.period.duration_secs() as f64
    }

    /// The period's reward pro-rated to the overlap (floor).
    pub fn reward_share(&self) -> u128 {
        mul_div_floor(self.period.reward, self.overlap_secs, self.period.duration_secs())
            .unwrap_or(0)
    }
}

/// Where a timestamp falls relative to the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleStatus {
    NotStarted,
    /// Inside the period with this index.
    Active(usize),
    Exhausted,
}

/// Ordered, contiguous, non-overlapping reward periods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSchedule {
    periods: Vec<RewardPeriod>,
}

impl RewardSchedule {
    /// Validate and wrap a list of periods.
    pub fn new(periods: Vec<RewardPeriod>) -> Result<Self, FarmError> {
        if periods.is_empty() {
            return Err(FarmError::InvalidSchedule("no reward periods".into()));
        }
        let mut total: u128 = 0;
        for (i, p) in periods.iter().enumerate() {
            if p.end <= p.start {
                return Err(FarmError::InvalidSchedule(format!(
                    "period {i} ends at {} before it starts at {}",
                    p.end, p.start
                )));
            }
            if i > 0 && periods[i - 1].end != p.start {
                return Err(FarmError::InvalidSchedule(format!(
                    "period {i} starts at {} but period {} ends at {}",
                    p.start,
                    i - 1,
                    periods[i - 1].end
                )));
            }
            total = total.checked_add(p.reward).ok_or(FarmError::Overflow)?;
        }
        Ok(Self { periods })
    }

    /// Like [`RewardSchedule::new`], additionally requiring the rewards to add up
    /// to `max_supply`.
    pub fn with_max_supply(periods: Vec<RewardPeriod>, max_supply: u128) -> Result<Self, FarmError> {
        let schedule = Self::new(periods)?;
        if schedule.total_reward() != max_supply {
            return Err(FarmError::InvalidSchedule(format!(
                "total reward {} does not equal max supply {}",
                TokenAmount::new(schedule.total_reward()),
                TokenAmount::new(max_supply)
            )));
        }
        Ok(schedule)
    }

    /// Consecutive periods of `period_secs` each, starting at `start`, where period
    /// `i` pays `first_reward / 2^i` and the last period pays whatever remains of
    /// `max_supply`.
    pub fn halving(
        start: Timestamp,
        period_secs: u64,
        count: usize,
        first_reward: u128,
        max_supply: u128,
    ) -> Result<Self, FarmError> {
        if count == 0 {
            return Err(FarmError::InvalidSchedule("no reward periods".into()));
        }
        if period_secs == 0 {
            return Err(FarmError::InvalidSchedule("period length must be non-zero".into()));
        }

        let mut periods = Vec::with_capacity(count);
        let mut allocated: u128 = 0;
        let mut period_start = start;
        for i in 0..count {
            let reward = if i + 1 == count {
                max_supply.checked_sub(allocated).ok_or_else(|| {
                    FarmError::InvalidSchedule(format!(
                        "halving rewards {} exceed max supply {}",
                        TokenAmount::new(allocated),
                        TokenAmount::new(max_supply)
                    ))
                })?
            } else {
                u32::try_from(i)
                    .ok()
                    .and_then(|shift| first_reward.checked_shr(shift))
                    .unwrap_or(0)
            };
            allocated = allocated.checked_add(reward).ok_or(FarmError::Overflow)?;
            let period_end = Timestamp::new(
                period_start
                    .as_secs()
                    .checked_add(period_secs)
                    .ok_or(FarmError::Overflow)?,
            );
            periods.push(RewardPeriod {
                start: period_start,
                end: period_end,
                reward,
            });
            period_start = period_end;
        }
        Self::with_max_supply(periods, max_supply)
    }

    pub fn periods(&self) -> &[RewardPeriod] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn start(&self) -> Timestamp {
        self.periods.first().map(|p| p.start).unwrap_or_default()
    }

    pub fn end(&self) -> Timestamp {
        self.periods.last().map(|p| p.end).unwrap_or_default()
    }

    /// Sum of all period rewards. Validated not to overflow at construction.
    pub fn total_reward(&self) -> u128 {
        self.periods.iter().map(|p| p.reward).sum()
    }

    /// The period containing `t` (start inclusive, end exclusive).
    pub fn period_at(&self, t: Timestamp) -> Option<(usize, &RewardPeriod)> {
        let idx = self.periods.partition_point(|p| p.end <= t);
        self.periods
            .get(idx)
            .filter(|p| p.start <= t)
            .map(|p| (idx, p))
    }

    pub fn status(&self, t: Timestamp) -> ScheduleStatus {
        if t < self.start() {
            ScheduleStatus::NotStarted
        } else if t >= self.end() {
            ScheduleStatus::Exhausted
        } else {
            self.period_at(t)
                .map(|(i, _)| ScheduleStatus::Active(i))
                .unwrap_or(ScheduleStatus::Exhausted)
        }
    }

    /// Fails with [`FarmError::ScheduleExhausted`] once every period has ended.
    pub fn ensure_active(&self, t: Timestamp) -> Result<ScheduleStatus, FarmError> {
        match self.status(t) {
            ScheduleStatus::Exhausted => Err(FarmError::ScheduleExhausted),
            status => Ok(status),
        }
    }

    /// Every period overlapping `[from, to]` with the overlap length in seconds.
    pub fn overlaps(&self, from: Timestamp, to: Timestamp) -> Vec<PeriodOverlap> {
        self.periods
            .iter()
            .enumerate()
            .filter_map(|(index, period)| {
                let overlap_secs = period.overlap_secs(from, to);
                (overlap_secs > 0).then_some(PeriodOverlap {
                    index,
                    period: *period,
                    overlap_secs,
                })
            })
            .collect()
    }

    /// Cumulative reward emitted from the schedule start up to `t`.
    ///
    /// Monotone in `t`, zero before the first period and equal to
    /// [`RewardSchedule::total_reward`] from the end of the last period on.
    pub fn emitted_until(&self, t: Timestamp) -> u128 {
        self.periods.iter().map(|p| p.emitted_until(t)).sum()
    }

    /// Reward emitted during `[from, to]`; zero when `to <= from`.
    pub fn emitted_between(&self, from: Timestamp, to: Timestamp) -> u128 {
        if to <= from {
            return 0;
        }
        self.emitted_until(to).saturating_sub(self.emitted_until(from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_types::{ONE_TOKEN, SECS_PER_DAY};

    const YEAR: u64 = 365 * SECS_PER_DAY;

    fn halving_schedule(start: u64) -> RewardSchedule {
        RewardSchedule::halving(
            Timestamp::new(start),
            YEAR,
            10,
            500_000 * ONE_TOKEN,
            1_000_000 * ONE_TOKEN,
        )
        .unwrap()
    }

    #[test]
    fn halving_schedule_has_ten_periods_summing_to_max_supply() {
        let s = halving_schedule(0);
        assert_eq!(s.len(), 10);
        assert_eq!(s.total_reward(), 1_000_000 * ONE_TOKEN);
        assert_eq!(s.periods()[0].reward, 500_000 * ONE_TOKEN);
        assert_eq!(s.periods()[1].reward, 250_000 * ONE_TOKEN);
        assert_eq!(s.periods()[2].reward, 125_000 * ONE_TOKEN);
        // the last period absorbs the halving remainder
        assert_eq!(s.periods()[9].reward, s.periods()[8].reward * 2);
        assert_eq!(s.end(), Timestamp::new(10 * YEAR));
    }

    #[test]
    fn halving_rejects_rewards_above_max_supply() {
        let err = RewardSchedule::halving(Timestamp::new(0), YEAR, 3, 800, 1_000).unwrap_err();
        assert!(matches!(err, FarmError::InvalidSchedule(_)));
    }

    #[test]
    fn new_rejects_gaps_and_empty_periods() {
        let gap = vec![
            RewardPeriod { start: Timestamp::new(0), end: Timestamp::new(10), reward: 1 },
            RewardPeriod { start: Timestamp::new(11), end: Timestamp::new(20), reward: 1 },
        ];
        assert!(RewardSchedule::new(gap).is_err());
        let empty = vec![RewardPeriod { start: Timestamp::new(5), end: Timestamp::new(5), reward: 1 }];
        assert!(RewardSchedule::new(empty).is_err());
        assert!(RewardSchedule::new(Vec::new()).is_err());
    }

    #[test]
    fn with_max_supply_requires_exact_total() {
        let periods = vec![RewardPeriod { start: Timestamp::new(0), end: Timestamp::new(10), reward: 99 }];
        assert!(RewardSchedule::with_max_supply(periods.clone(), 100).is_err());
        assert!(RewardSchedule::with_max_supply(periods, 99).is_ok());
    }

    #[test]
    fn emission_is_linear_within_a_period() {
        let s = halving_schedule(1_000);
        let two_days = s.emitted_between(Timestamp::new(1_000), Timestamp::new(1_000 + 2 * SECS_PER_DAY));
        assert_eq!(two_days, 500_000 * ONE_TOKEN * 2 / 365);
    }

    #[test]
    fn emission_is_zero_before_start_and_capped_after_end() {
        let s = halving_schedule(1_000);
        assert_eq!(s.emitted_until(Timestamp::new(0)), 0);
        assert_eq!(s.emitted_until(Timestamp::new(1_000)), 0);
        assert_eq!(s.emitted_until(s.end()), s.total_reward());
        assert_eq!(s.emitted_until(Timestamp::new(u64::MAX)), s.total_reward());
        assert_eq!(s.emitted_between(s.end(), s.end().plus_days(1000)), 0);
    }

    #[test]
    fn overlaps_cover_only_intersecting_periods() {
        let s = halving_schedule(0);
        let from = Timestamp::new(YEAR / 2);
        let to = Timestamp::new(YEAR + YEAR / 4);
        let overlaps = s.overlaps(from, to);
        assert_eq!(overlaps.len(), 2);
        assert_eq!(overlaps[0].index, 0);
        assert_eq!(overlaps[0].overlap_secs, YEAR / 2);
        assert!((overlaps[0].elapsed_fraction() - 0.5).abs() < 1e-9);
        assert_eq!(overlaps[1].index, 1);
        assert_eq!(overlaps[1].overlap_secs, YEAR / 4);
        assert_eq!(overlaps[1].reward_share(), 250_000 * ONE_TOKEN / 4);

        let sum: u128 = overlaps.iter().map(|o| o.reward_share()).sum();
        assert!(sum.abs_diff(s.emitted_between(from, to)) <= 1);
    }

    #[test]
    fn status_tracks_position_in_schedule() {
        let s = halving_schedule(100);
        assert_eq!(s.status(Timestamp::new(0)), ScheduleStatus::NotStarted);
        assert_eq!(s.status(Timestamp::new(100)), ScheduleStatus::Active(0));
        assert_eq!(s.status(Timestamp::new(100 + YEAR)), ScheduleStatus::Active(1));
        assert_eq!(s.status(s.end()), ScheduleStatus::Exhausted);
        assert!(matches!(s.ensure_active(s.end()), Err(FarmError::ScheduleExhausted)));
        assert!(s.ensure_active(Timestamp::new(0)).is_ok());
    }

    #[test]
    fn period_display_is_readable() {
        let p = RewardPeriod { start: Timestamp::new(0), end: Timestamp::new(YEAR), reward: 5 * ONE_TOKEN };
        assert_eq!(p.to_string(), "0s..31536000s (365d 0h) reward 5");
    }
}
