//! Operations for model-based testing.
//!
//! Operations represent every input the picker can see. They are generated
//! randomly by proptest (via `arbitrary`) and applied to both the model and
//! the real implementation.

use arbitrary::Arbitrary;

/// Inputs that can be applied to the picker.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Up button.
    Up,

    /// Down button.
    Down,

    /// Select button (confirm a send).
    Select,

    /// Transport reports the newest report as sent.
    ///
    /// No-op if nothing was ever sent.
    DeliverSent,

    /// Transport reports the newest report as failed.
    DeliverFailed {
        /// Platform reason code.
        code: u16,
    },

    /// Transport reports an older report as sent.
    ///
    /// No-op unless at least two reports were sent.
    DeliverStale,

    /// A companion message was dropped.
    InboxDropped,

    /// A companion message arrived.
    InboxMessage {
        /// Whether it carries a RESULT field.
        with_result: bool,
    },

    /// A companion message that does not parse.
    InboxGarbage,

    /// Make the transport refuse (or accept again) synchronously.
    SetRefusing {
        /// Refuse while true.
        on: bool,
    },

    /// Advance simulation time, then tick.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },
}
