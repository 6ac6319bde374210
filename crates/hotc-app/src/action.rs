//! Application side-effects.
//!
//! [`AppAction`] values are produced by the [`crate::App`] state machine for
//! the runtime to execute. Sending is not an action: the lifecycle owns the
//! transport and hands reports to it directly.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Redraw the screen.
    Render,

    /// Leave the app. The runtime persists the mood before exiting.
    Quit,
}
