//! Dividend distribution for governance token holders.
//!
//! Fees collected by the DAO accumulate in the distributor. Once per payment
//! interval the whole balance is set aside as the reward of a new distribution
//! interval. While that interval runs, every holder can claim once, in
//! proportion to the share of the token supply it held when the interval
//! opened. Whatever is left unclaimed when the interval ends rolls into the
//! next one.

pub mod distributor;
pub mod error;
pub mod interval;
pub mod sink;

pub use distributor::{DivsDistributor, DEFAULT_PAYMENT_INTERVAL_SECS};
pub use error::DivsError;
pub use interval::DistributionInterval;
pub use sink::{FeeLedger, FeeSink};
