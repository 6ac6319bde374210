//! Application layer for the mood picker
//!
//! Pure state machine and generic runtime, so the same orchestration code
//! runs in the terminal watch and in deterministic simulation.
//!
//! # Components
//!
//! - [`App`]: picker state machine (buttons, ticks, transport events)
//! - [`Screen`]: view model the UI renders (status line and mood icon)
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic start → event loop → shutdown orchestration

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod input;
mod runtime;
mod screen;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::Button;
pub use runtime::Runtime;
pub use screen::Screen;
