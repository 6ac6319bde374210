//! Message-send lifecycle state machine.
//!
//! Coordinates the single outbound slot, the send timeout and the
//! status-text revert. Every input arrives through [`SendLifecycle::confirm`]
//! or [`SendLifecycle::handle`]; watchdog expiry is detected by polling
//! ([`SendLifecycle::poll_timers`]) and fed back in as events, so timeouts and
//! transport completions are handled through the same entry point and their
//! interleavings can be replayed exactly in tests.
//!
//! # State Machine
//!
//! ```text
//!            confirm (send accepted)
//!  ┌──────┐ ─────────────────────────> ┌─────────┐
//!  │ Idle │                            │ Sending │
//!  └──────┘ <───────────────────────── └─────────┘
//!     ^      OutboxSent / OutboxFailed      │
//!     │      / TimeoutFired                 │ confirm → false
//!     │                                     └──────────┘
//!     │ confirm (send refused) resolves immediately as a failure
//! ```
//!
//! Each resolution (sent, failed, timed out) arms the status-reset watchdog,
//! which later puts the prompt back on screen.

use std::time::Duration;

use hotc_proto::{InboundAck, MoodReport};

use crate::{
    display::{StatusDisplay, StatusText},
    env::Environment,
    error::SendError,
    mood::MoodIndex,
    timer::{RearmableTimer, TimerHandle},
    transport::{OutboxTicket, Transport, TransportEvent, TransportReason},
};

/// Time allowed for the transport to report an outcome.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a result message stays on screen before the prompt returns.
pub const DEFAULT_STATUS_RESET_DELAY: Duration = Duration::from_secs(3);

/// Neutral prompt shown while nothing is happening.
pub const DEFAULT_PROMPT: &str = "How do you feel?";

/// What to do with a completion whose ticket is not the in-flight one.
///
/// This happens when the send timeout resolved the cycle before the
/// transport reported, possibly after a newer send has started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LateCompletionPolicy {
    /// Drop it. "Timed out" stays on screen and a newer send keeps its slot.
    #[default]
    Ignore,

    /// Apply it as if it were current: overwrite the status, arm the
    /// status reset and clear the slot.
    Apply,
}

/// Lifecycle tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Time allowed for the transport to report an outcome
    pub send_timeout: Duration,
    /// Delay before the status text reverts to the prompt
    pub status_reset_delay: Duration,
    /// Text the status reverts to
    pub prompt: String,
    /// Handling of completions for a cycle that is no longer in flight
    pub late_completion: LateCompletionPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
            status_reset_delay: DEFAULT_STATUS_RESET_DELAY,
            prompt: DEFAULT_PROMPT.to_string(),
            late_completion: LateCompletionPolicy::default(),
        }
    }
}

/// Outbound slot state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendState {
    /// Ready to send.
    #[default]
    Idle,

    /// One report in flight.
    Sending {
        /// Ticket issued by the transport for the report
        ticket: OutboxTicket,
    },
}

impl SendState {
    /// True while a report is in flight.
    pub fn is_sending(self) -> bool {
        matches!(self, Self::Sending { .. })
    }

    /// Ticket of the in-flight report.
    pub fn ticket(self) -> Option<OutboxTicket> {
        match self {
            Self::Idle => None,
            Self::Sending { ticket } => Some(ticket),
        }
    }
}

/// Input to [`SendLifecycle::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Notification from the transport.
    Transport(TransportEvent),

    /// The send timeout expired.
    TimeoutFired(TimerHandle),

    /// The status-reset delay expired.
    StatusResetFired(TimerHandle),
}

impl From<TransportEvent> for LifecycleEvent {
    fn from(event: TransportEvent) -> Self {
        Self::Transport(event)
    }
}

/// Observable lifecycle state, for invariant checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSnapshot {
    /// Outbound slot
    pub state: SendState,
    /// Send timeout pending
    pub timeout_armed: bool,
    /// Status reset pending
    pub status_reset_armed: bool,
    /// Last status text requested
    pub status: Option<String>,
}

/// Send lifecycle with its collaborators injected.
///
/// Owns the environment (clock), the transport (outbound channel) and the
/// display (status text sink).
pub struct SendLifecycle<E: Environment, T: Transport, D: StatusDisplay> {
    env: E,
    transport: T,
    display: D,
    config: LifecycleConfig,
    state: SendState,
    timeout: RearmableTimer<E::Instant, ()>,
    status_reset: RearmableTimer<E::Instant, String>,
    status: Option<String>,
}

impl<E, T, D> SendLifecycle<E, T, D>
where
    E: Environment,
    T: Transport,
    D: StatusDisplay,
{
    /// Idle lifecycle with no watchdog armed.
    pub fn new(env: E, transport: T, display: D, config: LifecycleConfig) -> Self {
        Self {
            env,
            transport,
            display,
            config,
            state: SendState::Idle,
            timeout: RearmableTimer::new(),
            status_reset: RearmableTimer::new(),
            status: None,
        }
    }

    /// Put the neutral prompt on screen.
    pub fn show_prompt(&mut self) {
        let prompt = self.config.prompt.clone();
        self.set_status(&prompt);
    }

    /// Send `mood` to the companion.
    ///
    /// Returns `false` without touching anything if a report is already in
    /// flight. Otherwise shows "Sending mood...", writes the report and
    /// hands it to the transport, then arms the send timeout. A synchronous
    /// refusal resolves the cycle on the spot as a failure; the request
    /// still counts as handled and `true` is returned.
    pub fn confirm(&mut self, mood: MoodIndex) -> bool {
        if let SendState::Sending { ticket } = self.state {
            tracing::debug!(%ticket, "send already in flight, confirm ignored");
            return false;
        }

        self.status_reset.cancel();
        self.set_status(StatusText::Sending.as_str());

        match self.begin_send(mood) {
            Ok(ticket) => {
                self.state = SendState::Sending { ticket };
                let now = self.env.now();
                self.timeout.arm(now, self.config.send_timeout, ());
                tracing::debug!(%ticket, %mood, "mood report sent to transport");
            },
            Err(e) => {
                tracing::error!(error = %e, %mood, "mood report could not be sent");
                self.resolve(StatusText::SendFailed);
            },
        }

        true
    }

    fn begin_send(&mut self, mood: MoodIndex) -> Result<OutboxTicket, SendError> {
        let mut buffer = self.transport.outbox_begin()?;
        MoodReport::new(mood.get(), self.env.wall_clock_secs()).write_to(&mut buffer)?;
        Ok(self.transport.outbox_send(buffer)?)
    }

    /// Process one event.
    pub fn handle(&mut self, event: impl Into<LifecycleEvent>) {
        match event.into() {
            LifecycleEvent::Transport(event) => self.handle_transport(event),
            LifecycleEvent::TimeoutFired(handle) => self.handle_timeout(handle),
            LifecycleEvent::StatusResetFired(handle) => self.handle_status_reset(handle),
        }
    }

    fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::OutboxSent { ticket } => {
                if self.accepts_completion(ticket) {
                    tracing::debug!(%ticket, "mood report delivered");
                    self.resolve(StatusText::Sent);
                }
            },
            TransportEvent::OutboxFailed { ticket, reason } => {
                if self.accepts_completion(ticket) {
                    tracing::error!(%ticket, reason = reason.code(), "mood report failed: {reason}");
                    self.resolve(StatusText::SendFailed);
                }
            },
            TransportEvent::InboxDropped { reason } => self.handle_inbox_dropped(reason),
            TransportEvent::InboxReceived { payload } => match InboundAck::decode(&payload) {
                Ok(ack) if ack.is_acknowledged() => {
                    tracing::debug!(result = ?ack.result, "companion acknowledged");
                    self.set_status(StatusText::Received.as_str());
                },
                Ok(_) => tracing::debug!("companion message without result"),
                Err(e) => tracing::warn!(error = %e, "malformed companion message ignored"),
            },
        }
    }

    fn handle_inbox_dropped(&mut self, reason: TransportReason) {
        tracing::error!(reason = reason.code(), "companion message dropped: {reason}");
        self.set_status(StatusText::Dropped.as_str());
    }

    fn accepts_completion(&self, ticket: OutboxTicket) -> bool {
        if self.state.ticket() == Some(ticket) {
            return true;
        }

        match self.config.late_completion {
            LateCompletionPolicy::Ignore => {
                tracing::debug!(%ticket, state = ?self.state, "late completion ignored");
                false
            },
            LateCompletionPolicy::Apply => {
                tracing::debug!(%ticket, state = ?self.state, "late completion applied");
                true
            },
        }
    }

    fn handle_timeout(&mut self, handle: TimerHandle) {
        if self.timeout.fire(handle).is_none() {
            tracing::trace!(%handle, "stale timeout ignored");
            return;
        }

        tracing::error!(state = ?self.state, "mood report timed out");
        self.set_status(StatusText::TimedOut.as_str());
        self.arm_status_reset();
        self.state = SendState::Idle;
    }

    fn handle_status_reset(&mut self, handle: TimerHandle) {
        match self.status_reset.fire(handle) {
            Some(text) => self.set_status(&text),
            None => tracing::trace!(%handle, "stale status reset ignored"),
        }
    }

    /// End the current cycle with `text` on screen.
    fn resolve(&mut self, text: StatusText) {
        self.timeout.cancel();
        self.set_status(text.as_str());
        self.arm_status_reset();
        self.state = SendState::Idle;
    }

    fn arm_status_reset(&mut self) {
        let now = self.env.now();
        let prompt = self.config.prompt.clone();
        self.status_reset.arm(now, self.config.status_reset_delay, prompt);
    }

    fn set_status(&mut self, text: &str) {
        self.display.set_status_text(text);
        self.status = Some(text.to_string());
    }

    /// Watchdogs due at `now`, timeout first.
    ///
    /// Nothing is consumed; feed the events back through
    /// [`SendLifecycle::handle`].
    pub fn poll_timers(&self, now: E::Instant) -> Vec<LifecycleEvent> {
        let mut due = Vec::new();
        if self.timeout.is_expired(now) {
            due.extend(self.timeout.handle().map(LifecycleEvent::TimeoutFired));
        }
        if self.status_reset.is_expired(now) {
            due.extend(self.status_reset.handle().map(LifecycleEvent::StatusResetFired));
        }
        due
    }

    /// Fire every watchdog due at `now`. Returns true if any fired.
    pub fn tick(&mut self, now: E::Instant) -> bool {
        let due = self.poll_timers(now);
        let fired = !due.is_empty();
        for event in due {
            self.handle(event);
        }
        fired
    }

    /// Time until the earliest pending watchdog. `None` when both are idle.
    pub fn next_deadline(&self, now: E::Instant) -> Option<Duration> {
        match (self.timeout.remaining(now), self.status_reset.remaining(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Observable state.
    pub fn snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            state: self.state,
            timeout_armed: self.timeout.is_armed(),
            status_reset_armed: self.status_reset.is_armed(),
            status: self.status.clone(),
        }
    }

    /// Outbound slot state.
    pub fn state(&self) -> SendState {
        self.state
    }

    /// True while a report is in flight.
    pub fn is_sending(&self) -> bool {
        self.state.is_sending()
    }

    /// Send timeout watchdog.
    pub fn timeout_watchdog(&self) -> &RearmableTimer<E::Instant, ()> {
        &self.timeout
    }

    /// Status reset watchdog.
    pub fn status_reset_watchdog(&self) -> &RearmableTimer<E::Instant, String> {
        &self.status_reset
    }

    /// Configuration in use.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Mutable display, for updates outside the send path (mood icon).
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
