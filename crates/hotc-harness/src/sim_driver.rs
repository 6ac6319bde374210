//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing, so the same [`hotc_app::Runtime`] orchestration
//! code runs in both the watch emulator and simulation. Instead of waiting,
//! it jumps the virtual clock to the next interesting instant.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use hotc_app::{AppEvent, Button, Driver, Screen};
use hotc_core::Environment;
use thiserror::Error;

use crate::{
    sim_env::{SimEnv, SimInstant},
    sim_transport::SimTransport,
};

/// Error type for simulation driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimDriverError {
    /// No scripted input left and nothing will ever happen
    #[error("simulation idle: no scripted input and nothing scheduled")]
    Idle,
}

/// One entry of the input script.
enum Step {
    Event(AppEvent<SimInstant>),
    Wait(Duration),
    WaitUntil(SimInstant),
}

/// Shared state for event injection and inspection.
#[derive(Default)]
struct SharedState {
    script: VecDeque<Step>,
    /// Transport outcomes that became due together with an earlier one.
    due: VecDeque<AppEvent<SimInstant>>,
    renders: Vec<Screen>,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share the script and the captured frames.
#[derive(Clone)]
pub struct SimDriver {
    env: SimEnv,
    transport: Option<SimTransport>,
    state: Arc<Mutex<SharedState>>,
}

impl SimDriver {
    /// Driver on `env` with no companion attached.
    pub fn new(env: SimEnv) -> Self {
        Self { env, transport: None, state: Arc::new(Mutex::new(SharedState::default())) }
    }

    /// Deliver the outcomes `transport` schedules.
    #[must_use]
    pub fn with_transport(mut self, transport: SimTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an event.
    pub fn inject(&self, event: impl Into<AppEvent<SimInstant>>) {
        self.lock().script.push_back(Step::Event(event.into()));
    }

    /// Queue a button press.
    pub fn press(&self, button: Button) {
        self.inject(button);
    }

    /// Let `duration` of virtual time pass before the next scripted input.
    ///
    /// Watchdogs and companion outcomes falling inside the gap are
    /// delivered in time order.
    pub fn wait(&self, duration: Duration) {
        self.lock().script.push_back(Step::Wait(duration));
    }

    /// Every frame rendered so far.
    pub fn renders(&self) -> Vec<Screen> {
        self.lock().renders.clone()
    }

    /// Most recent frame.
    pub fn last_screen(&self) -> Option<Screen> {
        self.lock().renders.last().cloned()
    }

    /// True once the runtime has stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    fn next_event(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<AppEvent<SimInstant>>, SimDriverError> {
        if let Some(event) = self.take_due() {
            return Ok(Some(event));
        }

        let now = self.env.now();
        let wait_until = {
            let mut state = self.lock();
            let script = &mut state.script;
            loop {
                match script.pop_front() {
                    Some(Step::Event(event)) => return Ok(Some(event)),
                    Some(Step::Wait(d)) => script.push_front(Step::WaitUntil(now + d)),
                    Some(Step::WaitUntil(until)) if until <= now => {},
                    Some(Step::WaitUntil(until)) => {
                        script.push_front(Step::WaitUntil(until));
                        break Some(until);
                    },
                    None => break None,
                }
            }
        };

        let watchdog_at = timeout.map(|t| now + t);
        let companion_at = self.transport.as_ref().and_then(SimTransport::next_event_at);
        let wake = [watchdog_at, companion_at, wait_until]
            .into_iter()
            .flatten()
            .min()
            .ok_or(SimDriverError::Idle)?;

        self.env.advance_to(wake);
        Ok(self.take_due())
    }

    fn take_due(&self) -> Option<AppEvent<SimInstant>> {
        let mut state = self.lock();
        if let Some(event) = state.due.pop_front() {
            return Some(event);
        }

        let transport = self.transport.as_ref()?;
        let mut due = transport.due_events(self.env.now()).into_iter().map(AppEvent::Transport);
        let first = due.next()?;
        state.due.extend(due);
        Some(first)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    fn poll_event(
        &mut self,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Option<AppEvent<SimInstant>>, SimDriverError>> + Send {
        std::future::ready(self.next_event(timeout))
    }

    fn now(&self) -> SimInstant {
        self.env.now()
    }

    fn render(&mut self, screen: &Screen) -> Result<(), SimDriverError> {
        self.lock().renders.push(screen.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}
