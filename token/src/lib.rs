//! The DAO governance token.
//!
//! A fungible token with a hard supply cap. Only the configured minter (the
//! farm) can create tokens. Voting power follows balances through delegation:
//! a holder's balance counts towards the votes of whoever it delegates to, and
//! holders that never delegated have no voting power. Vote weight and total
//! supply are checkpointed so past values can be queried.

pub mod checkpoints;
pub mod error;
pub mod token;

pub use checkpoints::{Checkpoint, Checkpoints};
pub use error::TokenError;
pub use token::GovernanceToken;
