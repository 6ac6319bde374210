//! Codec error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while writing or parsing a dictionary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Tuple does not fit in the remaining outbox capacity
    #[error("buffer overflow: tuple needs {needed} bytes, {available} available")]
    BufferOverflow {
        /// Bytes the tuple needs (header + value)
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Input ended before a declared field or value
    #[error("dictionary truncated: expected {expected} more bytes, got {actual}")]
    Truncated {
        /// Bytes required to continue parsing
        expected: usize,
        /// Bytes actually remaining
        actual: usize,
    },

    /// Tuple type byte is not one of the known types
    #[error("unknown tuple type {0}")]
    UnknownTupleType(u8),

    /// Integer tuple with a length other than 1, 2 or 4
    #[error("invalid integer width {width} for key {key}")]
    InvalidIntegerWidth {
        /// Tuple key
        key: u32,
        /// Declared value length
        width: u16,
    },

    /// Value does not fit in the requested integer width
    #[error("value {value} does not fit in {width} bytes")]
    ValueOutOfRange {
        /// Value that was rejected
        value: i64,
        /// Requested width in bytes
        width: usize,
    },

    /// Tuple count would exceed the one-byte header
    #[error("too many tuples (max {max})")]
    TooManyTuples {
        /// Maximum tuples per dictionary
        max: usize,
    },

    /// Required key is absent
    #[error("missing key {0}")]
    MissingKey(u32),

    /// Key is present with the wrong tuple type
    #[error("unexpected type for key {key}: expected {expected}")]
    UnexpectedType {
        /// Tuple key
        key: u32,
        /// Expected type name
        expected: &'static str,
    },
}
