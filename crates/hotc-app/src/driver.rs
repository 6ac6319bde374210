//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific input and rendering, while the generic
//! [`crate::Runtime`] handles all orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use crate::{AppEvent, Screen};

/// Abstracts I/O operations for the application runtime.
///
/// # Implementations
///
/// - **Terminal watch**: crossterm key events, an in-process companion
/// - **Simulation**: scripted events on a virtual clock
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next input event, at most `timeout`.
    ///
    /// `timeout` is `None` when no watchdog is pending and the driver may
    /// wait indefinitely. Returns `None` if nothing arrived in time.
    fn poll_event(
        &mut self,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Option<AppEvent<Self::Instant>>, Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Draw the watch face.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, screen: &Screen) -> Result<(), Self::Error>;

    /// Release platform resources.
    fn stop(&mut self);
}
