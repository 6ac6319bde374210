//! Redb-backed persistent storage.
//!
//! Uses Redb's ACID transactions with Copy-on-Write, so the mood written at
//! exit survives a crash of the next run.

use std::{path::Path, sync::Arc};

use hotc_core::{Storage, StorageError};
use redb::{Database, ReadableTableMetadata, TableDefinition};

/// Table: ints
/// Key: persist key (u32)
/// Value: stored integer (i32)
const INTS: TableDefinition<u32, i32> = TableDefinition::new("ints");

/// Durable integer store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStorage {
    db: Arc<Database>,
}

impl RedbStorage {
    /// Open or create a Redb database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(INTS).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<u64, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(INTS).map_err(|e| StorageError::Io(e.to_string()))?;
        table.len().map_err(|e| StorageError::Io(e.to_string()))
    }

    /// True if nothing has been stored yet.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl Storage for RedbStorage {
    fn read_int(&self, key: u32) -> Result<Option<i32>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;

        let table = txn.open_table(INTS).map_err(|e| StorageError::Io(e.to_string()))?;

        let value = table.get(key).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(value.map(|guard| guard.value()))
    }

    fn write_int(&self, key: u32, value: i32) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;

        {
            let mut table = txn.open_table(INTS).map_err(|e| StorageError::Io(e.to_string()))?;
            table.insert(key, value).map_err(|e| StorageError::Io(e.to_string()))?;
        }

        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(key, value, "persisted");
        Ok(())
    }
}
