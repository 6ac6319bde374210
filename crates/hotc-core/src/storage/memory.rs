use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use super::{Storage, StorageError};

/// In-memory storage for tests and simulation.
///
/// Clones share the same map, so a value written through one handle is
/// visible through every other, the way a device's persistent store
/// outlives a single app run.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<u32, i32>>>,
}

impl MemoryStorage {
    /// Create a new empty `MemoryStorage`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<u32, i32>>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Io("storage mutex poisoned".into()))
    }
}

impl Storage for MemoryStorage {
    fn read_int(&self, key: u32) -> Result<Option<i32>, StorageError> {
        Ok(self.lock()?.get(&key).copied())
    }

    fn write_int(&self, key: u32, value: i32) -> Result<(), StorageError> {
        self.lock()?.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read_int(1), Ok(None));
        assert_eq!(storage.exists(1), Ok(false));
    }

    #[test]
    fn write_overwrites() {
        let storage = MemoryStorage::new();
        storage.write_int(1, 3).unwrap();
        storage.write_int(1, 4).unwrap();
        assert_eq!(storage.read_int(1), Ok(Some(4)));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.write_int(7, -1).unwrap();
        assert_eq!(other.read_int(7), Ok(Some(-1)));
    }
}
