//! Error types for the send path.
//!
//! These never escape the lifecycle: a failed send is resolved locally as
//! "Mood send failed". They exist so the failure can be logged with its
//! cause.

use hotc_proto::ProtocolError;
use thiserror::Error;

use crate::transport::TransportError;

/// Why a confirmed send could not be handed to the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The transport refused `outbox_begin` or `outbox_send`
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The report did not fit the outbox
    #[error("encode failed: {0}")]
    Encode(#[from] ProtocolError),
}
