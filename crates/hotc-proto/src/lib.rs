//! Wire format for watch ↔ companion messages.
//!
//! Messages are small key/value dictionaries: a tuple count followed by
//! `[key][type][length][value]` tuples, little-endian. The watch writes a
//! [`MoodReport`] into a fixed-capacity [`OutboxBuffer`] handed out by the
//! transport, and parses the companion's reply as an [`InboundAck`].
//!
//! # Components
//!
//! - [`OutboxBuffer`]: bounded tuple writer (the transport's outbox)
//! - [`Dictionary`]: decoded tuple list with key lookup
//! - [`MessageKey`]: the agreed numeric keys
//! - [`MoodReport`] / [`InboundAck`]: the two message shapes

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod buffer;
mod dictionary;
pub mod errors;
mod keys;
mod message;

pub use buffer::{IntWidth, OutboxBuffer};
pub use dictionary::{Dictionary, Tuple, TupleType, TupleValue};
pub use errors::{ProtocolError, Result};
pub use keys::MessageKey;
pub use message::{InboundAck, MoodReport};
