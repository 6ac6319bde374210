//! Fuzz target for the send lifecycle
//!
//! Drives the real picker with arbitrary button presses, transport
//! outcomes (current, stale, failed), inbound messages and clock jumps.
//!
//! # Invariants
//!
//! - The reference model and the real picker never diverge
//! - Mood stays in range
//! - The timeout watchdog is armed iff a report is in flight
//! - The transport never sees a second report while one is in flight

#![no_main]

use hotc_harness::{InvariantRegistry, ModelPicker, Operation, SimulatedPicker};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u64, Vec<Operation>)| {
    let (seed, ops) = input;
    let registry = InvariantRegistry::standard();
    let mut model = ModelPicker::default();
    let mut real = SimulatedPicker::new(seed);

    for op in &ops {
        model.apply(op);
        real.apply(op);

        assert_eq!(model.observable_state(), real.observable_state(), "after {op:?}");
        if let Err(violation) = registry.check_all(&real.snapshot()) {
            panic!("after {op:?}: {violation:?}");
        }
    }
});
