#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use sym_cipher::{Algorithm, CipherRegistry, CipherSpec};
use sym_reader::{Reader, ReaderOptions};

fn registry() -> CipherRegistry {
    let mut registry = CipherRegistry::new();
    registry
        .register(
            1,
            CipherSpec::new(Algorithm::Aes128Cbc, vec![0x11; 16], vec![0x22; 16]).unwrap(),
        )
        .unwrap();
    registry.set_primary(1).unwrap();
    registry
}

// Fuzz target: full reader pipeline over arbitrary payload bytes.
//
// Input format:
//   byte 0: buffer_size (clamped to 1..=64)
//   bytes 1..: the stream (may or may not begin with the magic)
//
// Catches bugs in:
// - Priming and header detection at every buffer size
// - CBC partial-block bookkeeping across chunk boundaries
// - Finalize-exactly-once discipline
// - Pending buffer drain logic
// Errors are expected on garbage input; panics are not.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let buffer_size = usize::from(data[0]).clamp(1, 64);
    let payload = data[1..].to_vec();

    let options = ReaderOptions {
        buffer_size,
        ..ReaderOptions::default()
    };
    let Ok(mut reader) = Reader::new(Cursor::new(payload), &registry(), options) else {
        return;
    };

    let mut total = 0usize;
    loop {
        match reader.read_bytes(13) {
            Ok(Some(bytes)) => total += bytes.len(),
            Ok(None) | Err(_) => break,
        }
    }
    let _ = total;
    // Draining after an error must not panic either.
    let _ = reader.read_to_end();
});
