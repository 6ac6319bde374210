//! Bounded outbox writer.
//!
//! The transport hands out one [`OutboxBuffer`] per outbound message. Its
//! capacity is fixed when the transport opens the outbox, so every write
//! checks the remaining space before touching the buffer.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    dictionary::{DICT_HEADER_SIZE, TUPLE_HEADER_SIZE, TupleType},
    errors::{ProtocolError, Result},
};

/// Width of an integer tuple on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// 1 byte.
    W8,
    /// 2 bytes.
    W16,
    /// 4 bytes.
    W32,
}

impl IntWidth {
    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
        }
    }
}

/// Fixed-capacity dictionary writer.
///
/// # Invariants
///
/// - `encoded_len() <= capacity()` at all times. A write that would exceed
///   the capacity fails and leaves the buffer unchanged.
/// - Tuple count never exceeds `u8::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxBuffer {
    tuples: BytesMut,
    count: u8,
    capacity: usize,
}

impl OutboxBuffer {
    /// Outbox size the watch app opens with.
    pub const DEFAULT_CAPACITY: usize = 40;

    /// Create an empty buffer that holds at most `capacity` encoded bytes
    /// (including the tuple count prefix).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { tuples: BytesMut::with_capacity(capacity), count: 0, capacity }
    }

    /// Maximum encoded size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        DICT_HEADER_SIZE + self.tuples.len()
    }

    /// Number of tuples written so far.
    #[must_use]
    pub fn tuple_count(&self) -> usize {
        usize::from(self.count)
    }

    /// Write an unsigned integer tuple.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::ValueOutOfRange` if `value` does not fit in `width`
    /// - `ProtocolError::BufferOverflow` if the tuple does not fit
    /// - `ProtocolError::TooManyTuples` if the count prefix is exhausted
    pub fn write_uint(&mut self, key: u32, value: u32, width: IntWidth) -> Result<()> {
        let fits = match width {
            IntWidth::W8 => u8::try_from(value).is_ok(),
            IntWidth::W16 => u16::try_from(value).is_ok(),
            IntWidth::W32 => true,
        };
        if !fits {
            return Err(ProtocolError::ValueOutOfRange {
                value: i64::from(value),
                width: width.bytes(),
            });
        }

        self.reserve_tuple(width.bytes())?;
        self.put_tuple_header(key, TupleType::Uint, width.bytes());
        self.tuples.put_uint_le(u64::from(value), width.bytes());
        Ok(())
    }

    /// Write a signed integer tuple.
    ///
    /// # Errors
    ///
    /// Same as [`OutboxBuffer::write_uint`].
    pub fn write_int(&mut self, key: u32, value: i32, width: IntWidth) -> Result<()> {
        let fits = match width {
            IntWidth::W8 => i8::try_from(value).is_ok(),
            IntWidth::W16 => i16::try_from(value).is_ok(),
            IntWidth::W32 => true,
        };
        if !fits {
            return Err(ProtocolError::ValueOutOfRange {
                value: i64::from(value),
                width: width.bytes(),
            });
        }

        self.reserve_tuple(width.bytes())?;
        self.put_tuple_header(key, TupleType::Int, width.bytes());
        self.tuples.put_int_le(i64::from(value), width.bytes());
        Ok(())
    }

    /// Finish writing and return the wire bytes.
    #[must_use]
    pub fn freeze(self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.encoded_len());
        out.put_u8(self.count);
        out.put_slice(&self.tuples);
        out.freeze()
    }

    fn reserve_tuple(&self, value_len: usize) -> Result<()> {
        if self.count == u8::MAX {
            return Err(ProtocolError::TooManyTuples { max: usize::from(u8::MAX) });
        }

        let needed = TUPLE_HEADER_SIZE + value_len;
        let available = self.capacity.saturating_sub(self.encoded_len());
        if needed > available {
            return Err(ProtocolError::BufferOverflow { needed, available });
        }
        Ok(())
    }

    fn put_tuple_header(&mut self, key: u32, tuple_type: TupleType, value_len: usize) {
        debug_assert!(value_len <= usize::from(u16::MAX));

        self.tuples.put_u32_le(key);
        self.tuples.put_u8(tuple_type as u8);
        self.tuples.put_u16_le(value_len as u16);
        self.count += 1;
    }
}

impl Default for OutboxBuffer {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dictionary, TupleValue};

    #[test]
    fn empty_buffer_encodes_zero_count() {
        let buffer = OutboxBuffer::default();
        assert_eq!(buffer.encoded_len(), 1);
        assert_eq!(&buffer.freeze()[..], &[0]);
    }

    #[test]
    fn written_tuples_decode() {
        let mut buffer = OutboxBuffer::default();
        buffer.write_uint(1, 200, IntWidth::W8).unwrap();
        buffer.write_int(2, -300, IntWidth::W16).unwrap();

        let dict = Dictionary::decode(&buffer.freeze()).unwrap();
        assert_eq!(dict.find(1).map(|t| &t.value), Some(&TupleValue::Uint(200)));
        assert_eq!(dict.find(2).map(|t| &t.value), Some(&TupleValue::Int(-300)));
    }

    #[test]
    fn overflow_leaves_buffer_unchanged() {
        // Header (1) + one 4-byte tuple (11) = 12 bytes; a second one needs 11 more.
        let mut buffer = OutboxBuffer::with_capacity(20);
        buffer.write_uint(1, 7, IntWidth::W32).unwrap();
        let before = buffer.clone();

        let result = buffer.write_uint(2, 7, IntWidth::W32);
        assert_eq!(result, Err(ProtocolError::BufferOverflow { needed: 11, available: 8 }));
        assert_eq!(buffer, before);
    }

    #[test]
    fn rejects_value_wider_than_width() {
        let mut buffer = OutboxBuffer::default();
        assert_eq!(
            buffer.write_uint(1, 256, IntWidth::W8),
            Err(ProtocolError::ValueOutOfRange { value: 256, width: 1 })
        );
        assert_eq!(
            buffer.write_int(1, -129, IntWidth::W8),
            Err(ProtocolError::ValueOutOfRange { value: -129, width: 1 })
        );
        assert_eq!(buffer.tuple_count(), 0);
    }

    #[test]
    fn exact_fit_is_accepted() {
        let mut buffer = OutboxBuffer::with_capacity(1 + 8);
        buffer.write_uint(1, 1, IntWidth::W8).unwrap();
        assert_eq!(buffer.encoded_len(), buffer.capacity());
    }
}
