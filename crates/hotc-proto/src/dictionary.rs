//! Dictionary parsing.
//!
//! Layout on the wire:
//! `[count: u8]` followed by `count` tuples of
//! `[key: u32 LE][type: u8][length: u16 LE][value: length bytes]`.
//!
//! Parsing is strict about structure (truncation, unknown types, integer
//! widths) and lenient about content: unknown keys are kept, trailing bytes
//! after the last declared tuple are ignored.

use bytes::{Buf, Bytes};

use crate::errors::{ProtocolError, Result};

/// Size of the tuple count prefix.
pub(crate) const DICT_HEADER_SIZE: usize = 1;

/// Size of `[key][type][length]` in front of every value.
pub(crate) const TUPLE_HEADER_SIZE: usize = 7;

/// Tuple value type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TupleType {
    /// Raw bytes.
    ByteArray = 0,
    /// NUL-terminated UTF-8 string.
    CString = 1,
    /// Unsigned little-endian integer (1, 2 or 4 bytes).
    Uint = 2,
    /// Signed little-endian integer (1, 2 or 4 bytes).
    Int = 3,
}

impl TupleType {
    /// Parse a type tag. `None` for unknown tags.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::ByteArray),
            1 => Some(Self::CString),
            2 => Some(Self::Uint),
            3 => Some(Self::Int),
            _ => None,
        }
    }
}

/// Decoded tuple value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleValue {
    /// Raw bytes.
    ByteArray(Bytes),
    /// String with the trailing NUL removed.
    CString(String),
    /// Unsigned integer widened to 32 bits.
    Uint(u32),
    /// Signed integer widened to 32 bits.
    Int(i32),
}

impl TupleValue {
    /// Type tag of this value.
    #[must_use]
    pub fn tuple_type(&self) -> TupleType {
        match self {
            Self::ByteArray(_) => TupleType::ByteArray,
            Self::CString(_) => TupleType::CString,
            Self::Uint(_) => TupleType::Uint,
            Self::Int(_) => TupleType::Int,
        }
    }

    /// Unsigned value, or `None` for any other type.
    #[must_use]
    pub fn as_uint(&self) -> Option<u32> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Signed value, or `None` for any other type.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn parse(key: u32, tuple_type: TupleType, mut value: Bytes) -> Result<Self> {
        let width = value.len();
        match tuple_type {
            TupleType::ByteArray => Ok(Self::ByteArray(value)),
            TupleType::CString => {
                let text = value.strip_suffix(&[0]).unwrap_or(&value[..]);
                Ok(Self::CString(String::from_utf8_lossy(text).into_owned()))
            },
            TupleType::Uint => match width {
                1 => Ok(Self::Uint(u32::from(value.get_u8()))),
                2 => Ok(Self::Uint(u32::from(value.get_u16_le()))),
                4 => Ok(Self::Uint(value.get_u32_le())),
                _ => Err(ProtocolError::InvalidIntegerWidth { key, width: width as u16 }),
            },
            TupleType::Int => match width {
                1 => Ok(Self::Int(i32::from(value.get_i8()))),
                2 => Ok(Self::Int(i32::from(value.get_i16_le()))),
                4 => Ok(Self::Int(value.get_i32_le())),
                _ => Err(ProtocolError::InvalidIntegerWidth { key, width: width as u16 }),
            },
        }
    }
}

/// A single key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    /// Numeric key.
    pub key: u32,
    /// Decoded value.
    pub value: TupleValue,
}

/// Decoded dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    tuples: Vec<Tuple>,
}

impl Dictionary {
    /// Parse a dictionary from wire bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Truncated` if the input ends inside a header or value
    /// - `ProtocolError::UnknownTupleType` for an unknown type tag
    /// - `ProtocolError::InvalidIntegerWidth` for integer tuples not 1, 2 or 4
    ///   bytes wide
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut buf = bytes;
        ensure_remaining(buf, DICT_HEADER_SIZE)?;
        let count = buf.get_u8();

        let mut tuples = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            ensure_remaining(buf, TUPLE_HEADER_SIZE)?;
            let key = buf.get_u32_le();
            let tag = buf.get_u8();
            let len = usize::from(buf.get_u16_le());

            let tuple_type = TupleType::from_u8(tag).ok_or(ProtocolError::UnknownTupleType(tag))?;

            ensure_remaining(buf, len)?;
            let value = TupleValue::parse(key, tuple_type, buf.copy_to_bytes(len))?;
            tuples.push(Tuple { key, value });
        }

        Ok(Self { tuples })
    }

    /// First tuple with the given key. `None` if absent.
    #[must_use]
    pub fn find(&self, key: u32) -> Option<&Tuple> {
        self.tuples.iter().find(|t| t.key == key)
    }

    /// All tuples in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    /// Number of tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// True if the dictionary has no tuples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

fn ensure_remaining(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() < expected {
        return Err(ProtocolError::Truncated { expected, actual: buf.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple_bytes(key: u32, tag: u8, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&key.to_le_bytes());
        out.push(tag);
        out.extend_from_slice(&(value.len() as u16).to_le_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn empty_input_is_truncated() {
        assert!(matches!(Dictionary::decode(&[]), Err(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn zero_tuples_is_valid() {
        let dict = Dictionary::decode(&[0]).unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn decodes_all_integer_widths() {
        let mut wire = vec![3];
        wire.extend(tuple_bytes(10, 2, &[0xFF]));
        wire.extend(tuple_bytes(11, 2, &0xBEEFu16.to_le_bytes()));
        wire.extend(tuple_bytes(12, 3, &(-5i32).to_le_bytes()));

        let dict = Dictionary::decode(&wire).unwrap();
        assert_eq!(dict.find(10).and_then(|t| t.value.as_uint()), Some(0xFF));
        assert_eq!(dict.find(11).and_then(|t| t.value.as_uint()), Some(0xBEEF));
        assert_eq!(dict.find(12).and_then(|t| t.value.as_int()), Some(-5));
    }

    #[test]
    fn cstring_drops_trailing_nul() {
        let mut wire = vec![1];
        wire.extend(tuple_bytes(7, 1, b"ok\0"));

        let dict = Dictionary::decode(&wire).unwrap();
        assert_eq!(dict.find(7).map(|t| &t.value), Some(&TupleValue::CString("ok".into())));
    }

    #[test]
    fn rejects_three_byte_integer() {
        let mut wire = vec![1];
        wire.extend(tuple_bytes(1, 2, &[1, 2, 3]));

        assert_eq!(
            Dictionary::decode(&wire),
            Err(ProtocolError::InvalidIntegerWidth { key: 1, width: 3 })
        );
    }

    #[test]
    fn rejects_unknown_type() {
        let mut wire = vec![1];
        wire.extend(tuple_bytes(1, 9, &[1]));

        assert_eq!(Dictionary::decode(&wire), Err(ProtocolError::UnknownTupleType(9)));
    }

    #[test]
    fn rejects_value_shorter_than_declared() {
        let mut wire = vec![1];
        wire.extend(tuple_bytes(1, 0, &[1, 2, 3, 4]));
        wire.truncate(wire.len() - 2);

        assert!(matches!(
            Dictionary::decode(&wire),
            Err(ProtocolError::Truncated { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn rejects_missing_tuples() {
        let mut wire = vec![2];
        wire.extend(tuple_bytes(1, 2, &[1]));

        assert!(matches!(Dictionary::decode(&wire), Err(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn find_returns_first_duplicate() {
        let mut wire = vec![2];
        wire.extend(tuple_bytes(4, 2, &[1]));
        wire.extend(tuple_bytes(4, 2, &[2]));

        let dict = Dictionary::decode(&wire).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.find(4).and_then(|t| t.value.as_uint()), Some(1));
    }
}
