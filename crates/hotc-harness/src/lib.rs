//! Deterministic simulation harness for the mood picker.
//!
//! Virtual-clock implementations of the Environment, Transport, Storage and
//! Driver seams so the real lifecycle and app run reproducibly, with
//! latency, loss and failures injected from a seed.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the picker.
//! Operations are applied to both the model and the real app, and their
//! observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties that must hold after every
//! step. Use [`InvariantRegistry::standard()`] for the lifecycle invariants.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod display;
pub mod invariants;
pub mod model;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_transport;
pub mod storage;

pub use display::RecordingDisplay;
pub use invariants::{
    Invariant, InvariantRegistry, InvariantResult, MoodInRange, ResetOnlyWhenIdle,
    SingleInFlight, SystemSnapshot, TimeoutArmedWhileSending, Violation,
};
pub use model::{ModelPicker, ObservableState, Operation, SimulatedPicker};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_transport::{ChaosConfig, SimTransport};
pub use storage::ChaoticStorage;
