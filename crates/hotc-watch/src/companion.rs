//! In-process companion app.
//!
//! The watch face has no phone to talk to, so a tokio task plays the
//! companion. [`ChannelTransport`] hands accepted reports to the task over a
//! channel; the task decides each outcome with a seeded RNG and delivers
//! the resulting [`TransportEvent`]s back to the terminal driver after the
//! configured latency.
//!
//! ```text
//! App ──outbox_send──> ChannelTransport ──report──> Companion task
//!  ^                                                     │
//!  └──── TerminalDriver <──── TransportEvent ────────────┘
//! ```

use std::time::Duration;

use bytes::Bytes;
use hotc_core::{OutboxTicket, Transport, TransportError, TransportEvent, TransportReason};
use hotc_proto::{InboundAck, MoodReport, OutboxBuffer};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
};

/// How the companion treats incoming reports.
///
/// Rates are probabilities in `[0, 1]`, checked in this order: lost,
/// failed, delivered. A delivered report is answered with an ack unless the
/// ack itself is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionConfig {
    /// Delay before each outcome
    pub latency: Duration,
    /// Extra uniform delay in `[0, jitter]` before the delivery outcome
    pub jitter: Duration,
    /// Report vanishes without any outcome
    pub loss_rate: f64,
    /// Outcome is `OutboxFailed`
    pub failure_rate: f64,
    /// The ack is dropped on the way back
    pub drop_rate: f64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(300),
            jitter: Duration::ZERO,
            loss_rate: 0.0,
            failure_rate: 0.0,
            drop_rate: 0.0,
        }
    }
}

/// A report accepted by the transport.
#[derive(Debug)]
struct Report {
    ticket: OutboxTicket,
    payload: Bytes,
}

/// Transport whose far end is the companion task.
#[derive(Debug)]
pub struct ChannelTransport {
    next_ticket: u64,
    reports: UnboundedSender<Report>,
}

impl Transport for ChannelTransport {
    fn outbox_begin(&mut self) -> Result<OutboxBuffer, TransportError> {
        if self.reports.is_closed() {
            return Err(TransportError::Closed);
        }
        Ok(OutboxBuffer::default())
    }

    fn outbox_send(&mut self, buffer: OutboxBuffer) -> Result<OutboxTicket, TransportError> {
        let ticket = OutboxTicket(self.next_ticket + 1);
        let report = Report { ticket, payload: buffer.freeze() };
        self.reports.send(report).map_err(|_| TransportError::Closed)?;

        self.next_ticket += 1;
        tracing::debug!(%ticket, "report queued");
        Ok(ticket)
    }
}

/// Events the companion delivers, each after a delay relative to the
/// previous one.
type Plan = Vec<(Duration, TransportEvent)>;

/// Simulated companion app.
pub struct Companion {
    config: CompanionConfig,
    rng: ChaCha8Rng,
    reports: UnboundedReceiver<Report>,
    events: UnboundedSender<TransportEvent>,
}

impl Companion {
    /// Start the companion task.
    ///
    /// Returns the transport to hand to the app, the receiver the driver
    /// polls for outcomes, and the task handle. The task ends once the
    /// transport is dropped. Must be called inside a tokio runtime.
    pub fn spawn(
        config: CompanionConfig,
        seed: u64,
    ) -> (ChannelTransport, UnboundedReceiver<TransportEvent>, JoinHandle<()>) {
        let (report_tx, report_rx) = unbounded_channel();
        let (event_tx, event_rx) = unbounded_channel();

        let companion = Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            reports: report_rx,
            events: event_tx,
        };
        let task = tokio::spawn(companion.run());

        (ChannelTransport { next_ticket: 0, reports: report_tx }, event_rx, task)
    }

    async fn run(mut self) {
        while let Some(report) = self.reports.recv().await {
            let plan = self.plan(&report);
            if plan.is_empty() {
                continue;
            }
            tokio::spawn(deliver(plan, self.events.clone()));
        }
        tracing::debug!("companion stopped");
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    fn plan(&mut self, report: &Report) -> Plan {
        let ticket = report.ticket;
        if self.chance(self.config.loss_rate) {
            tracing::debug!(%ticket, "companion lost report");
            return Vec::new();
        }

        let jitter_ms = self.config.jitter.as_millis() as u64;
        let delay = self.config.latency + Duration::from_millis(self.rng.gen_range(0..=jitter_ms));
        if self.chance(self.config.failure_rate) {
            let reason = TransportReason::NotConnected;
            return vec![(delay, TransportEvent::OutboxFailed { ticket, reason })];
        }

        let mut plan = vec![(delay, TransportEvent::OutboxSent { ticket })];
        match MoodReport::decode(&report.payload) {
            Ok(received) => {
                tracing::info!(mood = received.mood, epoch = received.epoch, "companion got mood");
                plan.push((self.config.latency, self.reply()));
            },
            Err(e) => tracing::warn!(%ticket, error = %e, "companion could not parse report"),
        }
        plan
    }

    fn reply(&mut self) -> TransportEvent {
        if self.chance(self.config.drop_rate) {
            return TransportEvent::InboxDropped { reason: TransportReason::BufferOverflow };
        }

        let mut buffer = OutboxBuffer::default();
        if let Err(e) = InboundAck::write_result(&mut buffer, 0) {
            tracing::warn!(error = %e, "companion could not build ack");
        }
        TransportEvent::InboxReceived { payload: buffer.freeze() }
    }
}

async fn deliver(plan: Plan, events: UnboundedSender<TransportEvent>) {
    for (delay, event) in plan {
        tokio::time::sleep(delay).await;
        if events.send(event).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    fn report(transport: &mut ChannelTransport, mood: u8) -> OutboxTicket {
        let mut buffer = transport.outbox_begin().unwrap();
        MoodReport::new(mood, 1_700_000_000).write_to(&mut buffer).unwrap();
        transport.outbox_send(buffer).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn reliable_companion_sends_then_acks() {
        let (mut transport, mut events, _task) = Companion::spawn(CompanionConfig::default(), 1);
        let start = Instant::now();

        let ticket = report(&mut transport, 4);
        assert_eq!(events.recv().await, Some(TransportEvent::OutboxSent { ticket }));
        assert!(start.elapsed() >= Duration::from_millis(300));

        let ack = events.recv().await;
        assert!(start.elapsed() >= Duration::from_millis(600));
        assert!(
            matches!(&ack, Some(TransportEvent::InboxReceived { payload })
                if InboundAck::decode(payload).is_ok_and(|a| a.is_acknowledged())),
            "expected an ack, got {ack:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failing_companion_reports_failure() {
        let config = CompanionConfig { failure_rate: 1.0, ..CompanionConfig::default() };
        let (mut transport, mut events, _task) = Companion::spawn(config, 2);

        let ticket = report(&mut transport, 1);
        assert_eq!(
            events.recv().await,
            Some(TransportEvent::OutboxFailed { ticket, reason: TransportReason::NotConnected })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_ack_surfaces_as_inbox_drop() {
        let config = CompanionConfig { drop_rate: 1.0, ..CompanionConfig::default() };
        let (mut transport, mut events, _task) = Companion::spawn(config, 3);

        let ticket = report(&mut transport, 8);
        assert_eq!(events.recv().await, Some(TransportEvent::OutboxSent { ticket }));
        assert_eq!(
            events.recv().await,
            Some(TransportEvent::InboxDropped { reason: TransportReason::BufferOverflow })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn lost_report_produces_nothing() {
        let config = CompanionConfig { loss_rate: 1.0, ..CompanionConfig::default() };
        let (mut transport, mut events, _task) = Companion::spawn(config, 4);

        report(&mut transport, 2);
        let outcome = tokio::time::timeout(Duration::from_secs(60), events.recv()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn tickets_increase_and_closed_channel_refuses() {
        let (mut transport, _events, task) = Companion::spawn(CompanionConfig::default(), 5);

        assert_eq!(report(&mut transport, 0), OutboxTicket(1));
        assert_eq!(report(&mut transport, 0), OutboxTicket(2));

        task.abort();
        let _ = task.await;
        assert_eq!(transport.outbox_begin(), Err(TransportError::Closed));
        assert_eq!(transport.outbox_send(OutboxBuffer::default()), Err(TransportError::Closed));
    }
}
