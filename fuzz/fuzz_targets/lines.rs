#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use sym_cipher::{Algorithm, CipherRegistry, CipherSpec};
use sym_reader::{Reader, ReaderOptions};

// Fuzz target: line iteration with an arbitrary separator.
//
// Input format:
//   byte 0: separator length (clamped to 1..=4)
//   bytes 1..=n: separator bytes
//   rest: the stream
//
// Catches bugs in:
// - Separator search across pull boundaries
// - The incremental-search offset arithmetic
// - Unterminated-tail delivery
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let sep_len = usize::from(data[0]).clamp(1, 4).min(data.len() - 1);
    let separator = data[1..=sep_len].to_vec();
    let payload = data[1 + sep_len..].to_vec();

    let options = ReaderOptions {
        version: Some(1),
        buffer_size: 3,
        ..ReaderOptions::default()
    };
    let mut registry = CipherRegistry::new();
    registry
        .register(
            1,
            CipherSpec::new(Algorithm::Aes128Cbc, vec![0x11; 16], vec![0x22; 16]).unwrap(),
        )
        .unwrap();

    let Ok(mut reader) = Reader::new(Cursor::new(payload), &registry, options) else {
        return;
    };

    for line in reader.lines_with(separator) {
        if line.is_err() {
            break;
        }
    }
});
