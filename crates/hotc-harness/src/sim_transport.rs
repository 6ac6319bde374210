//! Simulated companion channel.
//!
//! [`SimTransport`] implements [`Transport`] and also plays the companion:
//! every accepted report gets an outcome scheduled on the virtual timeline
//! according to a [`ChaosConfig`] (delivered, failed, lost, acknowledged).
//! Tests pull due outcomes with [`SimTransport::due_events`] and feed them
//! to the lifecycle, or schedule events by hand.
//!
//! Clones share state, so a test keeps a handle after moving the transport
//! into the lifecycle.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use bytes::Bytes;
use hotc_core::{
    Environment, OutboxTicket, Transport, TransportError, TransportEvent, TransportReason,
};
use hotc_proto::{InboundAck, MoodReport, OutboxBuffer};

use crate::sim_env::{SimEnv, SimInstant};

/// Companion behaviour.
///
/// Rates are probabilities in `[0, 1]`. Outcomes are decided when the
/// report is accepted, in this order: lost, failed, delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct ChaosConfig {
    /// Delay before a delivery outcome
    pub latency: Duration,
    /// Extra uniform delay in `[0, jitter]`
    pub jitter: Duration,
    /// Report vanishes without any outcome
    pub loss_rate: f64,
    /// Outcome is `OutboxFailed`
    pub failure_rate: f64,
    /// A delivered report is answered with an ack
    pub ack_rate: f64,
    /// The ack is dropped on the way back (`InboxDropped`)
    pub inbox_drop_rate: f64,
}

impl ChaosConfig {
    /// No outcomes are scheduled; the test drives every event.
    pub fn manual() -> Self {
        Self {
            latency: Duration::ZERO,
            jitter: Duration::ZERO,
            loss_rate: 1.0,
            failure_rate: 0.0,
            ack_rate: 0.0,
            inbox_drop_rate: 0.0,
        }
    }

    /// Every report is delivered and acknowledged after `latency`.
    pub fn reliable(latency: Duration) -> Self {
        Self {
            latency,
            jitter: Duration::ZERO,
            loss_rate: 0.0,
            failure_rate: 0.0,
            ack_rate: 1.0,
            inbox_drop_rate: 0.0,
        }
    }
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self::reliable(Duration::from_millis(200))
    }
}

#[derive(Debug)]
struct Scheduled {
    at: SimInstant,
    seq: u64,
    event: TransportEvent,
}

#[derive(Debug, Default)]
struct SharedState {
    next_ticket: u64,
    next_seq: u64,
    sent: Vec<(OutboxTicket, Bytes)>,
    scheduled: Vec<Scheduled>,
    refusal: Option<TransportError>,
    capacity: Option<usize>,
}

impl SharedState {
    fn schedule(&mut self, at: SimInstant, event: TransportEvent) {
        self.next_seq += 1;
        self.scheduled.push(Scheduled { at, seq: self.next_seq, event });
    }
}

/// Simulated transport plus companion.
#[derive(Clone)]
pub struct SimTransport {
    env: SimEnv,
    chaos: ChaosConfig,
    shared: Arc<Mutex<SharedState>>,
}

impl SimTransport {
    /// Transport that never resolves anything on its own.
    pub fn manual(env: SimEnv) -> Self {
        Self::with_chaos(env, ChaosConfig::manual())
    }

    /// Transport whose companion behaves according to `chaos`.
    pub fn with_chaos(env: SimEnv, chaos: ChaosConfig) -> Self {
        Self { env, chaos, shared: Arc::new(Mutex::new(SharedState::default())) }
    }

    /// Hand out outboxes of `capacity` bytes instead of the default.
    #[must_use]
    pub fn with_outbox_capacity(self, capacity: usize) -> Self {
        self.lock().capacity = Some(capacity);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `outbox_send` fail synchronously with `error`, or accept again
    /// with `None`.
    pub fn refuse_sends(&self, error: Option<TransportError>) {
        self.lock().refusal = error;
    }

    /// Every accepted report, oldest first.
    pub fn sent(&self) -> Vec<(OutboxTicket, Bytes)> {
        self.lock().sent.clone()
    }

    /// Number of accepted reports.
    pub fn send_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Ticket of the most recently accepted report.
    pub fn last_ticket(&self) -> Option<OutboxTicket> {
        self.lock().sent.last().map(|(ticket, _)| *ticket)
    }

    /// Decoded reports, oldest first. Undecodable payloads are skipped.
    pub fn reports(&self) -> Vec<MoodReport> {
        self.lock().sent.iter().filter_map(|(_, bytes)| MoodReport::decode(bytes).ok()).collect()
    }

    /// Schedule `event` to be due at `at`.
    pub fn schedule(&self, at: SimInstant, event: TransportEvent) {
        self.lock().schedule(at, event);
    }

    /// Remove and return every event due at `now`, in schedule order.
    pub fn due_events(&self, now: SimInstant) -> Vec<TransportEvent> {
        let mut state = self.lock();
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut state.scheduled).into_iter().partition(|s| s.at <= now);
        state.scheduled = pending;
        due.sort_by_key(|s| (s.at, s.seq));
        due.into_iter().map(|s| s.event).collect()
    }

    /// When the earliest scheduled event becomes due.
    pub fn next_event_at(&self) -> Option<SimInstant> {
        self.lock().scheduled.iter().map(|s| s.at).min()
    }

    /// Number of scheduled events not yet due.
    pub fn pending_events(&self) -> usize {
        self.lock().scheduled.len()
    }

    /// Inbound message carrying a RESULT field.
    pub fn ack(result: u32) -> TransportEvent {
        let mut buffer = OutboxBuffer::default();
        if let Err(e) = InboundAck::write_result(&mut buffer, result) {
            tracing::warn!(error = %e, "simulated companion could not build ack");
        }
        TransportEvent::InboxReceived { payload: buffer.freeze() }
    }

    /// Inbound message without a RESULT field.
    pub fn empty_inbound() -> TransportEvent {
        TransportEvent::InboxReceived { payload: OutboxBuffer::default().freeze() }
    }

    fn plan_outcome(&self, state: &mut SharedState, ticket: OutboxTicket) {
        let chaos = &self.chaos;
        if self.env.chance(chaos.loss_rate) {
            tracing::trace!(%ticket, "report lost");
            return;
        }

        let at = self.env.now() + chaos.latency + self.env.jitter(chaos.jitter);
        if self.env.chance(chaos.failure_rate) {
            let reason = TransportReason::NotConnected;
            state.schedule(at, TransportEvent::OutboxFailed { ticket, reason });
            return;
        }

        state.schedule(at, TransportEvent::OutboxSent { ticket });
        if self.env.chance(chaos.ack_rate) {
            let back = at + chaos.latency;
            if self.env.chance(chaos.inbox_drop_rate) {
                let reason = TransportReason::BufferOverflow;
                state.schedule(back, TransportEvent::InboxDropped { reason });
            } else {
                state.schedule(back, Self::ack(0));
            }
        }
    }
}

impl Transport for SimTransport {
    fn outbox_begin(&mut self) -> Result<OutboxBuffer, TransportError> {
        let capacity = self.lock().capacity;
        Ok(capacity.map_or_else(OutboxBuffer::default, OutboxBuffer::with_capacity))
    }

    fn outbox_send(&mut self, buffer: OutboxBuffer) -> Result<OutboxTicket, TransportError> {
        let mut state = self.lock();
        if let Some(error) = state.refusal.clone() {
            return Err(error);
        }

        state.next_ticket += 1;
        let ticket = OutboxTicket(state.next_ticket);
        state.sent.push((ticket, buffer.freeze()));
        self.plan_outcome(&mut state, ticket);
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_buffer() -> OutboxBuffer {
        let mut buffer = OutboxBuffer::default();
        MoodReport::new(3, 0).write_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn reliable_companion_delivers_then_acks() {
        let env = SimEnv::with_seed(7);
        let mut transport =
            SimTransport::with_chaos(env.clone(), ChaosConfig::reliable(Duration::from_millis(100)));

        let ticket = transport.outbox_send(report_buffer()).unwrap();
        assert!(transport.due_events(env.now()).is_empty());

        env.advance(Duration::from_millis(100));
        assert_eq!(transport.due_events(env.now()), vec![TransportEvent::OutboxSent { ticket }]);

        env.advance(Duration::from_millis(100));
        assert_eq!(transport.due_events(env.now()), vec![SimTransport::ack(0)]);
        assert_eq!(transport.pending_events(), 0);
    }

    #[test]
    fn ack_carries_the_result_field() {
        match SimTransport::ack(5) {
            TransportEvent::InboxReceived { payload } => {
                let ack = InboundAck::decode(&payload).unwrap();
                assert_eq!(ack.result.and_then(|r| r.as_uint()), Some(5));
            },
            other => unreachable!("ack produced {other:?}"),
        }
    }

    #[test]
    fn manual_transport_schedules_nothing() {
        let env = SimEnv::default();
        let mut transport = SimTransport::manual(env.clone());
        transport.outbox_send(report_buffer()).unwrap();

        env.advance(Duration::from_secs(60));
        assert!(transport.due_events(env.now()).is_empty());
        assert_eq!(transport.reports()[0].mood, 3);
    }

    #[test]
    fn refusal_is_synchronous() {
        let mut transport = SimTransport::manual(SimEnv::default());
        transport.refuse_sends(Some(TransportError::Closed));

        assert_eq!(transport.outbox_send(report_buffer()), Err(TransportError::Closed));
        assert_eq!(transport.send_count(), 0);
    }
}
