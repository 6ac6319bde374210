//! Environment abstraction for deterministic testing.
//!
//! Decouples the lifecycle from system time. Simulation supplies a virtual
//! clock that only moves when the test advances it; production uses the
//! system clocks.

use std::time::Duration;

/// Abstract environment providing time and async sleep.
///
/// Implementations MUST guarantee that `now()` never goes backwards.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; simulation uses a
    /// virtual instant.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic). Drives watchdog deadlines.
    fn now(&self) -> Self::Instant;

    /// Seconds since the Unix epoch (wall clock). Stamped into mood reports.
    fn wall_clock_secs(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; the state machines never do.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
