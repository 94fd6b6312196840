//! Farm-specific errors.

use dao_store::StoreError;
use dao_token::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FarmError {
    #[error("insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: u128, staked: u128 },

    #[error("insufficient unstaked balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("asset {0} is not supported by the farm")]
    UnsupportedAsset(String),

    #[error("asset {0} is already supported")]
    AssetAlreadySupported(String),

    #[error("no position for {account} in {asset}")]
    NoPosition { account: String, asset: String },

    #[error("reward periods have already been added")]
    ScheduleAlreadySet,

    #[error("invalid reward schedule: {0}")]
    InvalidSchedule(String),

    /// Informational: accrual has stopped because every reward period has ended.
    #[error("reward schedule is exhausted; no further rewards accrue")]
    ScheduleExhausted,

    #[error("time went backwards: now {now}s precedes last update {last_update}s")]
    ClockWentBackwards { now: u64, last_update: u64 },

    #[error("arithmetic overflow in farm accounting")]
    Overflow,

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(String),
}
