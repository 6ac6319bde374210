//! Message channel to the companion app.
//!
//! Sending is split in two steps like the platform API: `outbox_begin` hands
//! out an empty buffer, `outbox_send` queues the filled buffer and returns
//! immediately. The outcome arrives later as a [`TransportEvent`] carrying
//! the [`OutboxTicket`] issued by `outbox_send`.

use std::fmt;

use bytes::Bytes;
use hotc_proto::OutboxBuffer;
use thiserror::Error;

/// Identifies one accepted outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutboxTicket(pub u64);

impl fmt::Display for OutboxTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "outbox#{}", self.0)
    }
}

/// Platform result code attached to transport failures.
///
/// Only logged. Control flow never branches on the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportReason {
    /// The companion did not acknowledge in time.
    SendTimeout,
    /// The companion rejected the message.
    SendRejected,
    /// No companion connected.
    NotConnected,
    /// The companion app is not running.
    AppNotRunning,
    /// Bad arguments to a channel call.
    InvalidArgs,
    /// A send is already pending on the channel.
    Busy,
    /// The message did not fit the buffer.
    BufferOverflow,
    /// Out of memory.
    OutOfMemory,
    /// The channel is closed.
    Closed,
    /// Internal channel error.
    InternalError,
    /// Any other code, preserved as received.
    Unknown(u32),
}

impl TransportReason {
    /// Numeric platform code.
    pub fn code(self) -> u32 {
        match self {
            Self::SendTimeout => 2,
            Self::SendRejected => 4,
            Self::NotConnected => 8,
            Self::AppNotRunning => 16,
            Self::InvalidArgs => 32,
            Self::Busy => 64,
            Self::BufferOverflow => 128,
            Self::OutOfMemory => 4096,
            Self::Closed => 8192,
            Self::InternalError => 16384,
            Self::Unknown(code) => code,
        }
    }

    /// Reason for a numeric platform code.
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => Self::SendTimeout,
            4 => Self::SendRejected,
            8 => Self::NotConnected,
            16 => Self::AppNotRunning,
            32 => Self::InvalidArgs,
            64 => Self::Busy,
            128 => Self::BufferOverflow,
            4096 => Self::OutOfMemory,
            8192 => Self::Closed,
            16384 => Self::InternalError,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for TransportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SendTimeout => "send timeout",
            Self::SendRejected => "send rejected",
            Self::NotConnected => "not connected",
            Self::AppNotRunning => "app not running",
            Self::InvalidArgs => "invalid args",
            Self::Busy => "busy",
            Self::BufferOverflow => "buffer overflow",
            Self::OutOfMemory => "out of memory",
            Self::Closed => "closed",
            Self::InternalError => "internal error",
            Self::Unknown(_) => "unknown",
        };
        write!(f, "{name} ({})", self.code())
    }
}

/// Synchronous transport refusal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The channel refused the call
    #[error("transport refused: {0}")]
    Refused(TransportReason),

    /// The channel has been shut down
    #[error("transport closed")]
    Closed,
}

/// Asynchronous channel notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The outbound message left the device.
    OutboxSent {
        /// Message the outcome belongs to
        ticket: OutboxTicket,
    },

    /// The outbound message could not be delivered.
    OutboxFailed {
        /// Message the outcome belongs to
        ticket: OutboxTicket,
        /// Platform failure code
        reason: TransportReason,
    },

    /// A companion message was lost before it could be read.
    InboxDropped {
        /// Platform failure code
        reason: TransportReason,
    },

    /// A companion message arrived.
    InboxReceived {
        /// Encoded dictionary
        payload: Bytes,
    },
}

/// Outbound half of the companion channel.
///
/// Calls never block. `outbox_send` returning `Ok` means the message was
/// accepted; exactly one of `OutboxSent`/`OutboxFailed` for the returned
/// ticket may follow later, or nothing at all if the channel loses it.
pub trait Transport {
    /// Buffer to write the next outbound message into.
    fn outbox_begin(&mut self) -> Result<OutboxBuffer, TransportError>;

    /// Queue a filled buffer for delivery.
    fn outbox_send(&mut self, buffer: OutboxBuffer) -> Result<OutboxTicket, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_stable() {
        for code in [2, 4, 8, 16, 32, 64, 128, 4096, 8192, 16384, 7] {
            assert_eq!(TransportReason::from_code(code).code(), code);
        }
        assert_eq!(TransportReason::from_code(2), TransportReason::SendTimeout);
        assert_eq!(TransportReason::from_code(3), TransportReason::Unknown(3));
    }

    #[test]
    fn reason_display_includes_code() {
        assert_eq!(TransportReason::SendTimeout.to_string(), "send timeout (2)");
    }
}
