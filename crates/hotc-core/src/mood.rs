//! Mood selection and its persistence.
//!
//! [`MoodIndex`] is the only way to name a mood, so an out-of-range index
//! cannot exist past construction. [`MoodStore`] owns the current selection,
//! loads it once at start and writes it back once at teardown.

use std::fmt;

use crate::{
    display::ResourceId,
    storage::{Storage, StorageError},
};

/// Persist key holding the last selected mood.
pub const MOOD_PERSIST_KEY: u32 = 1;

/// Icon resources for the ten moods (`IMAGE_EMOTION_01` .. `IMAGE_EMOTION_10`).
pub const MOOD_ICONS: [ResourceId; MoodIndex::COUNT] = [
    ResourceId(1),
    ResourceId(2),
    ResourceId(3),
    ResourceId(4),
    ResourceId(5),
    ResourceId(6),
    ResourceId(7),
    ResourceId(8),
    ResourceId(9),
    ResourceId(10),
];

/// Mood index in `[0, 9]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoodIndex(u8);

impl MoodIndex {
    /// Number of moods.
    pub const COUNT: usize = 10;

    /// First mood, also the default.
    pub const MIN: Self = Self(0);

    /// Last mood.
    pub const MAX: Self = Self(9);

    /// Index for `value`. `None` if it is not in `[0, 9]`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 { Some(Self(value)) } else { None }
    }

    /// Raw index.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Next mood, wrapping 9 → 0.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.0 == Self::MAX.0 { Self::MIN } else { Self(self.0 + 1) }
    }

    /// Previous mood, wrapping 0 → 9.
    #[must_use]
    pub const fn prev(self) -> Self {
        if self.0 == Self::MIN.0 { Self::MAX } else { Self(self.0 - 1) }
    }

    /// Icon resource for this mood.
    #[must_use]
    pub fn icon(self) -> ResourceId {
        MOOD_ICONS[usize::from(self.0)]
    }

    /// Mood shown by `icon`. `None` for resources that are not mood icons.
    #[must_use]
    pub fn from_icon(icon: ResourceId) -> Option<Self> {
        MOOD_ICONS
            .iter()
            .position(|&r| r == icon)
            .and_then(|i| u8::try_from(i).ok())
            .and_then(Self::new)
    }
}

impl TryFrom<i32> for MoodIndex {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u8::try_from(value).ok().and_then(Self::new).ok_or(value)
    }
}

impl From<MoodIndex> for u8 {
    fn from(mood: MoodIndex) -> Self {
        mood.0
    }
}

impl fmt::Display for MoodIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Holder of the current mood.
///
/// Mutations only touch memory; persistence happens in [`MoodStore::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodStore {
    current: MoodIndex,
}

impl MoodStore {
    /// Store starting at `initial`.
    #[must_use]
    pub fn new(initial: MoodIndex) -> Self {
        Self { current: initial }
    }

    /// Load the persisted mood.
    ///
    /// Falls back to [`MoodIndex::MIN`] when nothing is stored, when the
    /// backend errors, or when the stored value is out of range. Storage
    /// problems never stop the app from starting.
    pub fn load<S: Storage>(storage: &S) -> Self {
        let current = match storage.read_int(MOOD_PERSIST_KEY) {
            Ok(Some(raw)) => MoodIndex::try_from(raw).unwrap_or_else(|raw| {
                tracing::warn!(raw, "persisted mood out of range, using default");
                MoodIndex::MIN
            }),
            Ok(None) => MoodIndex::MIN,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted mood, using default");
                MoodIndex::MIN
            },
        };

        tracing::debug!(mood = %current, "mood loaded");
        Self { current }
    }

    /// Write the current mood unconditionally.
    ///
    /// # Errors
    ///
    /// Propagates the backend's `StorageError`.
    pub fn save<S: Storage>(&self, storage: &S) -> Result<(), StorageError> {
        storage.write_int(MOOD_PERSIST_KEY, i32::from(self.current.get()))?;
        tracing::debug!(mood = %self.current, "mood saved");
        Ok(())
    }

    /// Current mood.
    #[must_use]
    pub fn current(&self) -> MoodIndex {
        self.current
    }

    /// Select the next mood (wraps).
    pub fn increment(&mut self) -> MoodIndex {
        self.current = self.current.next();
        self.current
    }

    /// Select the previous mood (wraps).
    pub fn decrement(&mut self) -> MoodIndex {
        self.current = self.current.prev();
        self.current
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn increment_wraps_nine_to_zero() {
        let mut store = MoodStore::new(MoodIndex::MAX);
        assert_eq!(store.increment(), MoodIndex::MIN);
    }

    #[test]
    fn decrement_wraps_zero_to_nine() {
        let mut store = MoodStore::new(MoodIndex::MIN);
        assert_eq!(store.decrement(), MoodIndex::MAX);
    }

    #[test]
    fn new_rejects_ten() {
        assert_eq!(MoodIndex::new(10), None);
        assert_eq!(MoodIndex::try_from(-1), Err(-1));
        assert_eq!(MoodIndex::try_from(300), Err(300));
    }

    #[test]
    fn icons_map_both_ways() {
        for raw in 0..10u8 {
            let mood = MoodIndex::new(raw).unwrap();
            assert_eq!(MoodIndex::from_icon(mood.icon()), Some(mood));
        }
        assert_eq!(MoodIndex::from_icon(ResourceId(0)), None);
    }

    #[test]
    fn load_defaults_when_absent() {
        let storage = MemoryStorage::new();
        assert_eq!(MoodStore::load(&storage).current(), MoodIndex::MIN);
    }

    #[test]
    fn load_restores_saved_value() {
        let storage = MemoryStorage::new();
        let mut store = MoodStore::new(MoodIndex::MIN);
        for _ in 0..7 {
            store.increment();
        }
        store.save(&storage).unwrap();

        assert_eq!(MoodStore::load(&storage).current().get(), 7);
    }

    #[test]
    fn load_degrades_out_of_range_value() {
        let storage = MemoryStorage::new();
        storage.write_int(MOOD_PERSIST_KEY, 42).unwrap();
        assert_eq!(MoodStore::load(&storage).current(), MoodIndex::MIN);
    }

    proptest! {
        #[test]
        fn prop_mood_stays_in_range(start in 0u8..10, steps in prop::collection::vec(any::<bool>(), 0..100)) {
            let mut store = MoodStore::new(MoodIndex::new(start).unwrap());
            let mut expected = i32::from(start);

            for up in steps {
                if up {
                    store.increment();
                    expected = (expected + 1).rem_euclid(10);
                } else {
                    store.decrement();
                    expected = (expected - 1).rem_euclid(10);
                }
                prop_assert!(store.current() <= MoodIndex::MAX);
                prop_assert_eq!(i32::from(store.current().get()), expected);
            }
        }
    }
}
