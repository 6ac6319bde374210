//! Model picker - the oracle.

use hotc_core::{StatusText, lifecycle};

use super::Operation;

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Raw mood index.
    pub mood: u8,
    /// A report is in flight.
    pub sending: bool,
    /// Status line.
    pub status: String,
    /// Reports accepted by the transport.
    pub sends: usize,
    /// Send timeout pending.
    pub timeout_armed: bool,
    /// Status reset pending.
    pub status_reset_armed: bool,
}

/// Reference implementation of the picker with default lifecycle settings
/// and late completions ignored.
#[derive(Debug, Clone)]
pub struct ModelPicker {
    mood: u8,
    now_ms: u64,
    /// Ticket numbers issued so far; the newest is `issued`.
    issued: u64,
    in_flight: Option<u64>,
    timeout_at: Option<u64>,
    reset_at: Option<u64>,
    status: String,
    refusing: bool,
    send_timeout_ms: u64,
    reset_delay_ms: u64,
}

impl Default for ModelPicker {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ModelPicker {
    /// Started picker showing `mood` and the prompt.
    pub fn new(mood: u8) -> Self {
        Self {
            mood,
            now_ms: 0,
            issued: 0,
            in_flight: None,
            timeout_at: None,
            reset_at: None,
            status: lifecycle::DEFAULT_PROMPT.to_string(),
            refusing: false,
            send_timeout_ms: lifecycle::DEFAULT_SEND_TIMEOUT.as_millis() as u64,
            reset_delay_ms: lifecycle::DEFAULT_STATUS_RESET_DELAY.as_millis() as u64,
        }
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Up => self.mood = (self.mood + 1) % 10,
            Operation::Down => self.mood = (self.mood + 9) % 10,
            Operation::Select => self.select(),
            Operation::DeliverSent => self.complete(self.issued, StatusText::Sent),
            Operation::DeliverFailed { .. } => self.complete(self.issued, StatusText::SendFailed),
            Operation::DeliverStale => {
                if self.issued >= 2 {
                    self.complete(self.issued - 1, StatusText::Sent);
                }
            },
            Operation::InboxDropped => self.show(StatusText::Dropped),
            Operation::InboxMessage { with_result: true } => self.show(StatusText::Received),
            Operation::InboxMessage { with_result: false } | Operation::InboxGarbage => {},
            Operation::SetRefusing { on } => self.refusing = *on,
            Operation::AdvanceTime { millis } => self.advance(u64::from(*millis)),
        }
    }

    fn select(&mut self) {
        if self.in_flight.is_some() {
            return;
        }

        self.reset_at = None;
        self.show(StatusText::Sending);
        if self.refusing {
            self.resolve(StatusText::SendFailed);
        } else {
            self.issued += 1;
            self.in_flight = Some(self.issued);
            self.timeout_at = Some(self.now_ms + self.send_timeout_ms);
        }
    }

    fn complete(&mut self, ticket: u64, text: StatusText) {
        if ticket != 0 && self.in_flight == Some(ticket) {
            self.resolve(text);
        }
    }

    fn resolve(&mut self, text: StatusText) {
        self.timeout_at = None;
        self.show(text);
        self.reset_at = Some(self.now_ms + self.reset_delay_ms);
        self.in_flight = None;
    }

    fn advance(&mut self, millis: u64) {
        self.now_ms += millis;

        let timeout_due = self.timeout_at.is_some_and(|at| at <= self.now_ms);
        let reset_due = self.reset_at.is_some_and(|at| at <= self.now_ms);

        if timeout_due {
            self.timeout_at = None;
            self.show(StatusText::TimedOut);
            self.reset_at = Some(self.now_ms + self.reset_delay_ms);
            self.in_flight = None;
        }
        if reset_due {
            self.reset_at = None;
            self.status = lifecycle::DEFAULT_PROMPT.to_string();
        }
    }

    fn show(&mut self, text: StatusText) {
        self.status = text.as_str().to_string();
    }

    /// Model time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Observable state.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            mood: self.mood,
            sending: self.in_flight.is_some(),
            status: self.status.clone(),
            sends: self.issued as usize,
            timeout_armed: self.timeout_at.is_some(),
            status_reset_armed: self.reset_at.is_some(),
        }
    }
}
