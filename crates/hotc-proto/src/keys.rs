//! Agreed dictionary keys.

/// Numeric keys shared with the companion app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageKey {
    /// Selected mood index (outbound, 1-byte uint).
    Mood = 0,
    /// Wall-clock seconds at send time (outbound, 4-byte uint).
    Epoch = 1,
    /// Companion acknowledgment (inbound, presence only).
    Result = 2,
}

impl MessageKey {
    /// Numeric key as written on the wire.
    #[must_use]
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Known key for a numeric id. `None` for unknown keys.
    #[must_use]
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::Mood),
            1 => Some(Self::Epoch),
            2 => Some(Self::Result),
            _ => None,
        }
    }
}
