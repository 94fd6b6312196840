//! Token-specific errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("mint would exceed max supply: requested {requested}, available {available}")]
    SupplyCapExceeded { requested: u128, available: u128 },

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("{0} is not allowed to mint")]
    Unauthorized(String),

    #[error("minter has already been set")]
    MinterAlreadySet,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("checkpoint timestamp {at} precedes latest checkpoint {latest}")]
    CheckpointOutOfOrder { at: u64, latest: u64 },

    #[error("arithmetic overflow in token accounting")]
    Overflow,

    #[error("token state could not be decoded: {0}")]
    Decode(String),
}
