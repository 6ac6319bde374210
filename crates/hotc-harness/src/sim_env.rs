//! Virtual-clock environment.
//!
//! Time only moves when the test advances it, so watchdog expiry happens at
//! exactly the same point on every run. Randomness comes from one seeded
//! `ChaCha8Rng` shared by every clone.

use std::{
    fmt,
    ops::{Add, Sub},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use hotc_core::Environment;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wall clock at virtual time zero (2023-11-14T22:13:20Z).
pub const SIM_EPOCH_SECS: u64 = 1_700_000_000;

/// Point on the virtual timeline, as an offset from simulation start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Simulation start.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Offset from simulation start.
    pub fn elapsed(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

impl fmt::Display for SimInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0.as_millis())
    }
}

/// Deterministic environment for simulation.
///
/// Clones share the clock and the RNG.
#[derive(Clone)]
pub struct SimEnv {
    nanos: Arc<AtomicU64>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl SimEnv {
    /// Environment at time zero with RNG seeded from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Move the clock forward to `instant`. No-op if it is in the past.
    pub fn advance_to(&self, instant: SimInstant) {
        self.nanos.fetch_max(instant.0.as_nanos() as u64, Ordering::SeqCst);
    }

    /// True with probability `p` (clamped to `[0, 1]`).
    pub fn chance(&self, p: f64) -> bool {
        let p = p.clamp(0.0, 1.0);
        self.with_rng(|rng| rng.gen_bool(p))
    }

    /// Uniform duration in `[0, max]`.
    pub fn jitter(&self, max: Duration) -> Duration {
        let max = max.as_millis() as u64;
        Duration::from_millis(self.with_rng(|rng| rng.gen_range(0..=max)))
    }

    /// Uniform `u64`.
    pub fn random_u64(&self) -> u64 {
        self.with_rng(|rng| rng.r#gen())
    }

    fn with_rng<R>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(Duration::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }

    fn wall_clock_secs(&self) -> u64 {
        SIM_EPOCH_SECS + self.now().0.as_secs()
    }

    /// Advances the virtual clock instead of waiting.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_moves_only_when_advanced() {
        let env = SimEnv::with_seed(1);
        assert_eq!(env.now(), SimInstant::ZERO);

        env.advance(Duration::from_millis(1500));
        let clone = env.clone();
        assert_eq!(clone.now().elapsed(), Duration::from_millis(1500));
        assert_eq!(clone.wall_clock_secs(), SIM_EPOCH_SECS + 1);
    }

    #[test]
    fn advance_to_never_rewinds() {
        let env = SimEnv::default();
        env.advance(Duration::from_secs(5));
        env.advance_to(SimInstant::ZERO + Duration::from_secs(2));
        assert_eq!(env.now().elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn same_seed_same_choices() {
        let a = SimEnv::with_seed(42);
        let b = SimEnv::with_seed(42);
        let xs: Vec<_> = (0..16).map(|_| a.random_u64()).collect();
        let ys: Vec<_> = (0..16).map(|_| b.random_u64()).collect();
        assert_eq!(xs, ys);
    }
}
