//! The token farm: time-weighted distribution of a capped governance token
//! to liquidity-pool stakers.
//!
//! A fixed supply is emitted over an ordered schedule of reward periods. At any
//! instant the emission is shared among all staked LP units in proportion to
//! stake, so an account earns
//! `Σ period_reward × (stake / total_staked) × (overlap / period_duration)`
//! integrated piecewise over every interval between stake changes.
//!
//! This crate handles:
//! - The reward schedule and its cumulative emission curve
//! - The stake ledger (idle deposits, staked balances, per-asset totals)
//! - The accrual engine (reward-per-unit accumulator, settlement)
//! - The farm facade (settle-before-mutate operations, payouts, auto-delegation)
//! - Shared, serialized access for concurrent callers

pub mod accrual;
pub mod config;
pub mod error;
pub mod farm;
pub mod ledger;
pub mod math;
pub mod schedule;
pub mod shared;
pub mod sink;

pub use accrual::{AccrualEngine, ACC_PRECISION};
pub use config::FarmConfig;
pub use error::FarmError;
pub use farm::{Farm, StakeReceipt};
pub use ledger::{AccountRecord, GlobalStakeState, StakeLedger, StakePosition};
pub use schedule::{PeriodOverlap, RewardPeriod, RewardSchedule, ScheduleStatus};
pub use shared::SharedFarm;
pub use sink::{Payout, RewardSink, TokenMinter};
