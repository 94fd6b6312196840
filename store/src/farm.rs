use crate::StoreError;
use dao_types::{AccountId, AssetId};

/// Key of a persisted stake position.
pub type PositionKey = (AccountId, AssetId);

/// Store trait for persisting farm state to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the `dao-farm` crate
/// (which would create a circular dependency). The farm serializes and
/// deserializes its own types.
pub trait FarmStore {
    fn get_position(&self, key: &PositionKey) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_position(&self, key: &PositionKey, position: &[u8]) -> Result<(), StoreError>;
    fn iter_positions(&self) -> Result<Vec<(PositionKey, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
