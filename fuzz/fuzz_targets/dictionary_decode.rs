//! Fuzz target for the dictionary wire format
//!
//! Feeds arbitrary bytes to every decoder the watch and the companion use:
//! - Dictionary::decode (tuple framing, type tags, integer widths)
//! - MoodReport::decode (companion side)
//! - InboundAck::decode (watch side)
//!
//! Decoding should NEVER panic. All invalid inputs should return an error.

#![no_main]

use hotc_proto::{Dictionary, InboundAck, MoodReport, OutboxBuffer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(dict) = Dictionary::decode(data) {
        assert!(dict.len() <= usize::from(u8::MAX));
    }

    let _ = InboundAck::decode(data);

    // A report that decodes re-encodes to something that decodes the same.
    if let Ok(report) = MoodReport::decode(data) {
        let mut buffer = OutboxBuffer::default();
        if report.write_to(&mut buffer).is_ok() {
            let bytes = buffer.freeze();
            assert_eq!(MoodReport::decode(&bytes).ok(), Some(report));
        }
    }
});
