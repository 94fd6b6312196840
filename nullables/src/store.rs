//! Nullable store: thread-safe in-memory farm storage for testing.

use dao_store::{FarmStore, PositionKey, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory farm store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullFarmStore {
    positions: Mutex<HashMap<PositionKey, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl NullFarmStore {
    pub fn new() -> Self {
        Self {
            positions: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }

    /// Number of persisted positions.
    pub fn position_count(&self) -> usize {
        self.positions.lock().unwrap().len()
    }
}

impl Default for NullFarmStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FarmStore for NullFarmStore {
    fn get_position(&self, key: &PositionKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.positions.lock().unwrap().get(key).cloned())
    }

    fn put_position(&self, key: &PositionKey, position: &[u8]) -> Result<(), StoreError> {
        self.positions
            .lock()
            .unwrap()
            .insert(key.clone(), position.to_vec());
        Ok(())
    }

    fn iter_positions(&self) -> Result<Vec<(PositionKey, Vec<u8>)>, StoreError> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
