//! Persistence abstraction.
//!
//! The watch persists a handful of 32-bit integers under numeric keys. The
//! trait is synchronous: reads happen once at start, writes once at
//! teardown.

mod error;
mod memory;

pub use error::StorageError;
pub use memory::MemoryStorage;

/// Integer key/value persistence.
///
/// Must be Clone (the app and the driver may both hold a handle) and
/// Send + Sync. Implementations typically share internal state via Arc, so
/// clones access the same underlying storage.
pub trait Storage: Clone + Send + Sync + 'static {
    /// Value stored under `key`. `None` if the key was never written.
    fn read_int(&self, key: u32) -> Result<Option<i32>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    fn write_int(&self, key: u32, value: i32) -> Result<(), StorageError>;

    /// True if `key` has a stored value.
    fn exists(&self, key: u32) -> Result<bool, StorageError> {
        Ok(self.read_int(key)?.is_some())
    }
}
