//! Watch buttons.

/// Physical button on the watch.
///
/// Decouples the picker from the terminal library the emulator uses, so
/// simulation can press buttons directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Next mood.
    Up,
    /// Previous mood.
    Down,
    /// Send the current mood.
    Select,
    /// Leave the app.
    Back,
}
