//! Core logic for the mood picker.
//!
//! Holds the selected mood, its persistence, and the state machine that
//! sends it to the companion app. Nothing here performs I/O directly: time,
//! the message channel, the screen and the persistent store are injected
//! through the [`Environment`], [`Transport`], [`StatusDisplay`] and
//! [`Storage`] traits.
//!
//! # Components
//!
//! - [`MoodStore`]: current mood with wraparound, load at start, save at exit
//! - [`RearmableTimer`]: cancel-and-replace watchdog
//! - [`SendLifecycle`]: single in-flight send with timeout and status reset

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod display;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod mood;
pub mod storage;
pub mod timer;
pub mod transport;

pub use display::{ResourceId, StatusDisplay, StatusText};
pub use env::Environment;
pub use error::SendError;
pub use lifecycle::{
    LateCompletionPolicy, LifecycleConfig, LifecycleEvent, LifecycleSnapshot, SendLifecycle,
    SendState,
};
pub use mood::{MOOD_PERSIST_KEY, MoodIndex, MoodStore};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use timer::{RearmableTimer, TimerHandle};
pub use transport::{OutboxTicket, Transport, TransportError, TransportEvent, TransportReason};
