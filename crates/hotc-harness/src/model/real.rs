//! The real app on simulated collaborators.

use std::time::Duration;

use bytes::Bytes;
use hotc_app::{App, AppEvent, Button};
use hotc_core::{
    Environment, LifecycleConfig, MemoryStorage, OutboxTicket, TransportError, TransportEvent,
    TransportReason,
};

use super::{ObservableState, Operation};
use crate::{SimEnv, SimTransport, SystemSnapshot};

/// Real [`App`] driven by the same [`Operation`]s as [`super::ModelPicker`].
///
/// The transport is manual: completions only happen when an operation
/// delivers one, always for the most recently issued ticket unless the
/// operation asks for a stale one.
pub struct SimulatedPicker {
    app: App<SimEnv, SimTransport>,
    env: SimEnv,
    transport: SimTransport,
}

impl SimulatedPicker {
    /// Started picker with default lifecycle settings.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, LifecycleConfig::default())
    }

    /// Started picker with `config`.
    pub fn with_config(seed: u64, config: LifecycleConfig) -> Self {
        let env = SimEnv::with_seed(seed);
        let transport = SimTransport::manual(env.clone());
        let mut app = App::new(env.clone(), transport.clone(), config);
        app.start(&MemoryStorage::new());
        Self { app, env, transport }
    }

    fn deliver(&mut self, event: TransportEvent) {
        self.app.handle(AppEvent::Transport(event));
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Up => {
                self.app.handle(AppEvent::Key(Button::Up));
            },
            Operation::Down => {
                self.app.handle(AppEvent::Key(Button::Down));
            },
            Operation::Select => {
                self.app.handle(AppEvent::Key(Button::Select));
            },
            Operation::DeliverSent => {
                if let Some(ticket) = self.transport.last_ticket() {
                    self.deliver(TransportEvent::OutboxSent { ticket });
                }
            },
            Operation::DeliverFailed { code } => {
                if let Some(ticket) = self.transport.last_ticket() {
                    let reason = TransportReason::from_code(u32::from(*code));
                    self.deliver(TransportEvent::OutboxFailed { ticket, reason });
                }
            },
            Operation::DeliverStale => {
                if let Some(OutboxTicket(last)) = self.transport.last_ticket()
                    && last >= 2
                {
                    self.deliver(TransportEvent::OutboxSent { ticket: OutboxTicket(last - 1) });
                }
            },
            Operation::InboxDropped => {
                self.deliver(TransportEvent::InboxDropped { reason: TransportReason::Busy });
            },
            Operation::InboxMessage { with_result } => {
                let event =
                    if *with_result { SimTransport::ack(0) } else { SimTransport::empty_inbound() };
                self.deliver(event);
            },
            Operation::InboxGarbage => {
                // One tuple of unknown type 9.
                let payload = Bytes::from_static(&[1, 0, 0, 0, 0, 9, 0, 0]);
                self.deliver(TransportEvent::InboxReceived { payload });
            },
            Operation::SetRefusing { on } => {
                let error = on.then_some(TransportError::Refused(TransportReason::Busy));
                self.transport.refuse_sends(error);
            },
            Operation::AdvanceTime { millis } => {
                self.env.advance(Duration::from_millis(u64::from(*millis)));
                let now = self.env.now();
                self.app.handle(AppEvent::Tick { now });
            },
        }
    }

    /// State comparable with [`super::ModelPicker::observable_state`].
    pub fn observable_state(&self) -> ObservableState {
        let snapshot = self.app.lifecycle().snapshot();
        ObservableState {
            mood: self.app.mood().get(),
            sending: snapshot.state.is_sending(),
            status: self.app.screen().status_text().to_string(),
            sends: self.transport.send_count(),
            timeout_armed: snapshot.timeout_armed,
            status_reset_armed: snapshot.status_reset_armed,
        }
    }

    /// Snapshot for invariant checks.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot::from_app(&self.app, self.transport.last_ticket())
    }

    /// The app under test.
    pub fn app(&self) -> &App<SimEnv, SimTransport> {
        &self.app
    }

    /// Shared handle on the transport.
    pub fn transport(&self) -> &SimTransport {
        &self.transport
    }
}
