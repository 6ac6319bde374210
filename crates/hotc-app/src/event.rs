//! Application input events.
//!
//! Events originate from three sources:
//! - Button presses and window resizes from the device.
//! - Clock ticks that let watchdogs expire.
//! - Notifications from the companion channel.

use hotc_core::TransportEvent;

use crate::Button;

/// Events processed by the App state machine.
///
/// `I` is the environment's instant type, real or virtual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent<I> {
    /// Button press.
    Key(Button),

    /// Clock tick.
    Tick {
        /// Current time
        now: I,
    },

    /// Companion channel notification.
    Transport(TransportEvent),

    /// Screen resize (columns, rows).
    Resize(u16, u16),
}

impl<I> From<TransportEvent> for AppEvent<I> {
    fn from(event: TransportEvent) -> Self {
        Self::Transport(event)
    }
}

impl<I> From<Button> for AppEvent<I> {
    fn from(button: Button) -> Self {
        Self::Key(button)
    }
}
