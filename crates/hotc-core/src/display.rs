//! UI boundary.
//!
//! The lifecycle and the picker only ever *request* UI changes. Rendering is
//! owned by whatever implements [`StatusDisplay`].

use std::fmt;

/// Image resource identifier understood by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res#{}", self.0)
    }
}

/// Sink for status-text and icon updates. Fire-and-forget.
pub trait StatusDisplay {
    /// Replace the status line.
    fn set_status_text(&mut self, text: &str);

    /// Replace the mood icon.
    fn set_mood_icon(&mut self, icon: ResourceId);
}

/// Fixed status messages shown by the send lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusText {
    /// Send in flight.
    Sending,
    /// Transport reported the report as sent.
    Sent,
    /// Transport reported a failure, or refused the send.
    SendFailed,
    /// No outcome before the send timeout.
    TimedOut,
    /// An inbound companion message was dropped.
    Dropped,
    /// The companion acknowledged.
    Received,
}

impl StatusText {
    /// Text shown on screen.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sending => "Sending mood...",
            Self::Sent => "Mood sent",
            Self::SendFailed => "Mood send failed",
            Self::TimedOut => "Timed out",
            Self::Dropped => "Message dropped",
            Self::Received => "Message received",
        }
    }
}

impl fmt::Display for StatusText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
