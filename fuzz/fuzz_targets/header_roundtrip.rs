#![no_main]

use libfuzzer_sys::fuzz_target;
use sym_wire::{StreamHeader, HEADER_SIZE, MAX_VERSION};

// Fuzz target: StreamHeader write->detect roundtrip.
//
// Takes 3 bytes of fuzz input as (version, compressed), constructs a
// header, serializes it, re-detects it, and asserts the output matches.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let version = u16::from_le_bytes([data[0], data[1]]) & MAX_VERSION;
    let compressed = data[2] & 1 == 1;
    let header = StreamHeader::new(version, compressed).unwrap();

    let mut buf = [0u8; HEADER_SIZE];
    header.write_to(&mut buf).unwrap();

    let parsed = StreamHeader::detect(&buf).unwrap().unwrap();
    assert_eq!(parsed.version, version);
    assert_eq!(parsed.compressed, compressed);
});
