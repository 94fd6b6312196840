//! Fundamental types for the DAO token farm.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account and asset identifiers, fixed-point token amounts, timestamps and the clock seam.

pub mod address;
pub mod amount;
pub mod error;
pub mod time;

pub use address::{AccountId, AssetId};
pub use amount::{TokenAmount, DECIMALS, ONE_TOKEN};
pub use error::TypesError;
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
