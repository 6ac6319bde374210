//! Reference model for model-based testing.
//!
//! [`ModelPicker`] is a deliberately naive picker: plain fields, deadlines
//! in milliseconds, no timer objects. Proptest generates [`Operation`]
//! sequences, applies them to both the model and the real app, and compares
//! the resulting [`ObservableState`]. [`SimulatedPicker`] is the real side
//! of that comparison.

mod operation;
mod picker;
mod real;

pub use operation::Operation;
pub use picker::{ModelPicker, ObservableState};
pub use real::SimulatedPicker;
