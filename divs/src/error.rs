use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DivsError {
    #[error("no fees to distribute")]
    NoFunds,

    #[error("distribution interval {id} is running until {ends_at}s")]
    IntervalRunning { id: u64, ends_at: u64 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("payment interval must be non-zero")]
    InvalidPaymentInterval,

    #[error("arithmetic overflow in dividend accounting")]
    Overflow,

    #[error("fee payment refused: {0}")]
    PaymentRefused(String),

    #[error("distributor state could not be decoded: {0}")]
    Decode(String),
}
