#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: StreamHeader::detect with arbitrary bytes.
//
// Catches bugs in:
// - Magic byte matching on short inputs
// - Truncated flags handling
// - Flags decoding
fuzz_target!(|data: &[u8]| {
    let _ = sym_wire::StreamHeader::detect(data);
});
