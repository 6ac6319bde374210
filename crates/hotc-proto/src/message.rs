//! Message shapes carried in dictionaries.

use crate::{
    Dictionary, IntWidth, MessageKey, OutboxBuffer, TupleValue,
    errors::{ProtocolError, Result},
};

/// Outbound mood report: the selected mood plus the time it was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodReport {
    /// Mood index (0-9).
    pub mood: u8,
    /// Wall-clock seconds, truncated to 32 bits.
    pub epoch: u32,
}

impl MoodReport {
    /// Pair a mood with the current wall clock.
    ///
    /// The clock is truncated to 32 bits. Timestamps are advisory, so the
    /// wrap in 2106 is accepted.
    #[must_use]
    pub fn new(mood: u8, wall_clock_secs: u64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let epoch = wall_clock_secs as u32;
        Self { mood, epoch }
    }

    /// Write MOOD then EPOCH into the outbox.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::BufferOverflow` if the outbox cannot hold both
    /// tuples. Nothing is rolled back if only the first tuple fits; the
    /// caller discards the buffer on error.
    pub fn write_to(&self, buffer: &mut OutboxBuffer) -> Result<()> {
        buffer.write_uint(MessageKey::Mood.id(), u32::from(self.mood), IntWidth::W8)?;
        buffer.write_uint(MessageKey::Epoch.id(), self.epoch, IntWidth::W32)?;
        Ok(())
    }

    /// Parse a report on the companion side.
    ///
    /// # Errors
    ///
    /// - Any structural error from [`Dictionary::decode`]
    /// - `ProtocolError::MissingKey` if MOOD or EPOCH is absent
    /// - `ProtocolError::UnexpectedType` if either is not an unsigned integer
    /// - `ProtocolError::ValueOutOfRange` if MOOD does not fit in a byte
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let dict = Dictionary::decode(bytes)?;
        let mood = required_uint(&dict, MessageKey::Mood)?;
        let epoch = required_uint(&dict, MessageKey::Epoch)?;

        let mood = u8::try_from(mood)
            .map_err(|_| ProtocolError::ValueOutOfRange { value: i64::from(mood), width: 1 })?;

        Ok(Self { mood, epoch })
    }
}

fn required_uint(dict: &Dictionary, key: MessageKey) -> Result<u32> {
    let tuple = dict.find(key.id()).ok_or(ProtocolError::MissingKey(key.id()))?;
    tuple
        .value
        .as_uint()
        .ok_or(ProtocolError::UnexpectedType { key: key.id(), expected: "uint" })
}

/// Inbound acknowledgment from the companion.
///
/// Only the presence of RESULT carries meaning; its content is kept for
/// logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundAck {
    /// RESULT value if the companion sent one.
    pub result: Option<TupleValue>,
}

impl InboundAck {
    /// Parse an inbound dictionary.
    ///
    /// A missing RESULT key is not an error; it yields `result: None`.
    ///
    /// # Errors
    ///
    /// Any structural error from [`Dictionary::decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let dict = Dictionary::decode(bytes)?;
        let result = dict.find(MessageKey::Result.id()).map(|t| t.value.clone());
        Ok(Self { result })
    }

    /// True if the companion acknowledged.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.result.is_some()
    }

    /// Encode an acknowledgment carrying `result` (companion side).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::BufferOverflow` if `buffer` is too small.
    pub fn write_result(buffer: &mut OutboxBuffer, result: u32) -> Result<()> {
        buffer.write_uint(MessageKey::Result.id(), result, IntWidth::W32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trip() {
        let report = MoodReport::new(3, 1_700_000_000);
        let mut buffer = OutboxBuffer::default();
        report.write_to(&mut buffer).unwrap();

        assert_eq!(MoodReport::decode(&buffer.freeze()).unwrap(), report);
    }

    #[test]
    fn epoch_wraps_past_u32() {
        let report = MoodReport::new(0, u64::from(u32::MAX) + 6);
        assert_eq!(report.epoch, 5);
    }

    #[test]
    fn report_fits_default_outbox() {
        let mut buffer = OutboxBuffer::default();
        MoodReport::new(9, u64::from(u32::MAX)).write_to(&mut buffer).unwrap();
        assert!(buffer.encoded_len() <= OutboxBuffer::DEFAULT_CAPACITY);
    }

    #[test]
    fn report_overflows_tiny_outbox() {
        let mut buffer = OutboxBuffer::with_capacity(10);
        let result = MoodReport::new(1, 1).write_to(&mut buffer);
        assert!(matches!(result, Err(ProtocolError::BufferOverflow { .. })));
    }

    #[test]
    fn report_requires_epoch() {
        let mut buffer = OutboxBuffer::default();
        buffer.write_uint(MessageKey::Mood.id(), 2, IntWidth::W8).unwrap();

        assert_eq!(
            MoodReport::decode(&buffer.freeze()),
            Err(ProtocolError::MissingKey(MessageKey::Epoch.id()))
        );
    }

    #[test]
    fn report_rejects_signed_mood() {
        let mut buffer = OutboxBuffer::default();
        buffer.write_int(MessageKey::Mood.id(), 2, IntWidth::W8).unwrap();
        buffer.write_uint(MessageKey::Epoch.id(), 2, IntWidth::W32).unwrap();

        assert_eq!(
            MoodReport::decode(&buffer.freeze()),
            Err(ProtocolError::UnexpectedType { key: MessageKey::Mood.id(), expected: "uint" })
        );
    }

    #[test]
    fn ack_absent_result_is_not_an_error() {
        let mut buffer = OutboxBuffer::default();
        buffer.write_uint(99, 1, IntWidth::W8).unwrap();

        let ack = InboundAck::decode(&buffer.freeze()).unwrap();
        assert!(!ack.is_acknowledged());
    }

    #[test]
    fn ack_with_result() {
        let mut buffer = OutboxBuffer::default();
        InboundAck::write_result(&mut buffer, 1).unwrap();

        let ack = InboundAck::decode(&buffer.freeze()).unwrap();
        assert_eq!(ack.result, Some(TupleValue::Uint(1)));
    }
}
