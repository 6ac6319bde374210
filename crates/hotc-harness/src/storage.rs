//! Chaotic storage wrapper for fault injection testing
//!
//! Delegates to an underlying [`Storage`] but fails operations, either at a
//! seeded random rate or on demand, to check that a broken store never
//! stops the picker from starting or exiting.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use hotc_core::{Storage, StorageError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Storage wrapper that injects failures.
///
/// Clones share the RNG, the switches and the counter.
#[derive(Clone)]
pub struct ChaoticStorage<S: Storage> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Arc<Mutex<ChaCha8Rng>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    operation_count: Arc<AtomicUsize>,
}

impl<S: Storage> ChaoticStorage<S> {
    /// Wrap `inner`, failing each operation with probability `failure_rate`.
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        Self {
            inner,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
            operation_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wrap `inner` without random failures; use the switches instead.
    pub fn reliable(inner: S) -> Self {
        Self::with_seed(inner, 0.0, 0)
    }

    /// Fail every read while `on`.
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    /// Fail every write while `on`.
    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    /// Underlying storage (for checking state after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of storage operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::SeqCst)
    }

    fn should_fail(&self, forced: &AtomicBool) -> bool {
        self.operation_count.fetch_add(1, Ordering::SeqCst);
        if forced.load(Ordering::SeqCst) {
            return true;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_bool(self.failure_rate)
    }
}

impl<S: Storage> Storage for ChaoticStorage<S> {
    fn read_int(&self, key: u32) -> Result<Option<i32>, StorageError> {
        if self.should_fail(&self.fail_reads) {
            return Err(StorageError::Io(format!("injected read failure for key {key}")));
        }
        self.inner.read_int(key)
    }

    fn write_int(&self, key: u32, value: i32) -> Result<(), StorageError> {
        if self.should_fail(&self.fail_writes) {
            return Err(StorageError::Io(format!("injected write failure for key {key}")));
        }
        self.inner.write_int(key, value)
    }
}

#[cfg(test)]
mod tests {
    use hotc_core::MemoryStorage;

    use super::*;

    #[test]
    fn switches_force_failures() {
        let storage = ChaoticStorage::reliable(MemoryStorage::new());
        storage.write_int(1, 4).unwrap();

        storage.fail_reads(true);
        assert!(storage.read_int(1).is_err());
        storage.fail_reads(false);
        assert_eq!(storage.read_int(1), Ok(Some(4)));
        assert_eq!(storage.operation_count(), 3);
    }

    #[test]
    fn full_rate_always_fails() {
        let storage = ChaoticStorage::with_seed(MemoryStorage::new(), 1.0, 9);
        assert!(storage.write_int(1, 1).is_err());
        assert!(storage.inner().is_empty());
    }
}
