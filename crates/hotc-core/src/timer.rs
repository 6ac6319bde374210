//! Single-shot, cancel-and-replace watchdog.
//!
//! A [`RearmableTimer`] is an owned optional deadline plus a payload. Arming
//! always cancels the previous instance first, so there is never more than
//! one live watchdog per timer. Each arm produces a fresh [`TimerHandle`];
//! a fire event carrying any other handle is stale and is ignored.
//!
//! The timer does no I/O. The owner polls it with the current time
//! ([`RearmableTimer::is_expired`]) and then consumes it with
//! [`RearmableTimer::fire`].

use std::{fmt, ops::Sub, time::Duration};

/// Identity of one arming of a [`RearmableTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw generation number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Armed<I, P> {
    handle: TimerHandle,
    armed_at: I,
    after: Duration,
    payload: P,
}

/// Watchdog holding at most one pending deadline with a payload.
#[derive(Debug, Clone)]
pub struct RearmableTimer<I, P> {
    armed: Option<Armed<I, P>>,
    generation: u64,
}

impl<I, P> Default for RearmableTimer<I, P> {
    fn default() -> Self {
        Self { armed: None, generation: 0 }
    }
}

impl<I, P> RearmableTimer<I, P>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Disarmed timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm to expire `after` from `now`, replacing any pending instance.
    pub fn arm(&mut self, now: I, after: Duration, payload: P) -> TimerHandle {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let handle = TimerHandle(self.generation);
        self.armed = Some(Armed { handle, armed_at: now, after, payload });
        handle
    }

    /// Disarm. Returns the payload of the canceled instance, if any.
    ///
    /// Canceling a disarmed timer is a no-op.
    pub fn cancel(&mut self) -> Option<P> {
        self.armed.take().map(|a| a.payload)
    }

    /// True while an instance is pending.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Handle of the pending instance.
    pub fn handle(&self) -> Option<TimerHandle> {
        self.armed.as_ref().map(|a| a.handle)
    }

    /// Payload of the pending instance.
    pub fn payload(&self) -> Option<&P> {
        self.armed.as_ref().map(|a| &a.payload)
    }

    /// True if the pending instance is due at `now`.
    pub fn is_expired(&self, now: I) -> bool {
        self.armed.as_ref().is_some_and(|a| now >= a.armed_at && now - a.armed_at >= a.after)
    }

    /// Time left until the pending instance is due. Zero once due.
    pub fn remaining(&self, now: I) -> Option<Duration> {
        self.armed.as_ref().map(|a| {
            let elapsed = if now >= a.armed_at { now - a.armed_at } else { Duration::ZERO };
            a.after.saturating_sub(elapsed)
        })
    }

    /// Consume the pending instance if `handle` identifies it.
    ///
    /// Returns `None` for a stale handle (canceled or replaced instance),
    /// leaving the current instance untouched.
    pub fn fire(&mut self, handle: TimerHandle) -> Option<P> {
        if self.handle() == Some(handle) { self.cancel() } else { None }
    }
}
