//! Abstract storage traits for the DAO token farm.
//!
//! Every storage backend (embedded database, in-memory for testing) implements
//! these traits. The farm crate depends only on the traits.

pub mod error;
pub mod farm;

pub use error::StoreError;
pub use farm::{FarmStore, PositionKey};
