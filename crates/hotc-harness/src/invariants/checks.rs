//! Standard invariant checks.

use hotc_core::{MoodIndex, SendState};

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// The mood index is always a valid mood.
pub struct MoodInRange;

impl Invariant for MoodInRange {
    fn name(&self) -> &'static str {
        "mood_in_range"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if MoodIndex::new(state.mood).is_none() {
            return Err(Violation {
                invariant: self.name(),
                message: format!("mood {} outside 0..=9", state.mood),
            });
        }
        Ok(())
    }
}

/// The send timeout is armed if and only if a report is in flight.
///
/// An armed timeout while idle would later fire "Timed out" for nothing; a
/// missing one while sending would leave the slot locked forever on loss.
pub struct TimeoutArmedWhileSending;

impl Invariant for TimeoutArmedWhileSending {
    fn name(&self) -> &'static str {
        "timeout_armed_while_sending"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let sending = state.lifecycle.state.is_sending();
        if sending != state.lifecycle.timeout_armed {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "state {:?} with timeout_armed = {}",
                    state.lifecycle.state, state.lifecycle.timeout_armed
                ),
            });
        }
        Ok(())
    }
}

/// No status reset is pending while a report is in flight.
///
/// Otherwise the prompt would replace "Sending mood..." mid-send.
pub struct ResetOnlyWhenIdle;

impl Invariant for ResetOnlyWhenIdle {
    fn name(&self) -> &'static str {
        "reset_only_when_idle"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.lifecycle.state.is_sending() && state.lifecycle.status_reset_armed {
            return Err(Violation {
                invariant: self.name(),
                message: format!("status reset armed in state {:?}", state.lifecycle.state),
            });
        }
        Ok(())
    }
}

/// While sending, the in-flight report is the newest one the transport saw.
///
/// A newer ticket means a second report was handed over while the slot was
/// held.
pub struct SingleInFlight;

impl Invariant for SingleInFlight {
    fn name(&self) -> &'static str {
        "single_in_flight"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if let SendState::Sending { ticket } = state.lifecycle.state
            && state.last_issued_ticket != Some(ticket)
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "in flight {ticket}, transport last issued {:?}",
                    state.last_issued_ticket
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hotc_core::OutboxTicket;

    use super::*;

    fn sending(ticket: u64) -> SystemSnapshot {
        let mut snapshot = SystemSnapshot::idle(3);
        snapshot.lifecycle.state = SendState::Sending { ticket: OutboxTicket(ticket) };
        snapshot.lifecycle.timeout_armed = true;
        snapshot.last_issued_ticket = Some(OutboxTicket(ticket));
        snapshot
    }

    #[test]
    fn detects_mood_out_of_range() {
        assert!(MoodInRange.check(&SystemSnapshot::idle(10)).is_err());
    }

    #[test]
    fn detects_timeout_without_send() {
        let mut snapshot = SystemSnapshot::idle(0);
        snapshot.lifecycle.timeout_armed = true;
        assert!(TimeoutArmedWhileSending.check(&snapshot).is_err());
        assert!(TimeoutArmedWhileSending.check(&sending(1)).is_ok());
    }

    #[test]
    fn detects_reset_during_send() {
        let mut snapshot = sending(1);
        snapshot.lifecycle.status_reset_armed = true;
        assert!(ResetOnlyWhenIdle.check(&snapshot).is_err());
    }

    #[test]
    fn detects_second_send() {
        let mut snapshot = sending(1);
        snapshot.last_issued_ticket = Some(OutboxTicket(2));
        assert!(SingleInFlight.check(&snapshot).is_err());
    }
}
