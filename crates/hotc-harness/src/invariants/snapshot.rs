//! Observable state snapshots for invariant checking.
//!
//! Invariants operate on snapshots rather than live state so every check
//! sees the same instant.

use hotc_app::App;
use hotc_core::{
    Environment, LifecycleSnapshot, OutboxTicket, SendLifecycle, SendState, StatusDisplay,
    Transport,
};

/// Snapshot of the picker and its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSnapshot {
    /// Raw mood index.
    pub mood: u8,
    /// Lifecycle state and watchdogs.
    pub lifecycle: LifecycleSnapshot,
    /// Newest ticket the transport has issued. `None` before the first send.
    pub last_issued_ticket: Option<OutboxTicket>,
}

impl SystemSnapshot {
    /// Idle picker showing `mood` that has never sent anything.
    pub fn idle(mood: u8) -> Self {
        Self {
            mood,
            lifecycle: LifecycleSnapshot {
                state: SendState::Idle,
                timeout_armed: false,
                status_reset_armed: false,
                status: None,
            },
            last_issued_ticket: None,
        }
    }

    /// Capture an app.
    pub fn from_app<E, T>(app: &App<E, T>, last_issued_ticket: Option<OutboxTicket>) -> Self
    where
        E: Environment,
        T: Transport,
    {
        Self::from_lifecycle(app.lifecycle(), app.mood().get(), last_issued_ticket)
    }

    /// Capture a bare lifecycle.
    pub fn from_lifecycle<E, T, D>(
        lifecycle: &SendLifecycle<E, T, D>,
        mood: u8,
        last_issued_ticket: Option<OutboxTicket>,
    ) -> Self
    where
        E: Environment,
        T: Transport,
        D: StatusDisplay,
    {
        Self { mood, lifecycle: lifecycle.snapshot(), last_issued_ticket }
    }
}
