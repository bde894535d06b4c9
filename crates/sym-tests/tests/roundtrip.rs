//! Roundtrip integration tests for the encrypt → read pipeline.
//!
//! Each test fabricates a stream with the write-side helpers in
//! [`sym_tests`] and reads it back through [`Reader`], asserting that
//! the delivered plaintext is byte-identical to the original regardless
//! of how the reads are sliced:
//!
//!   - byte-count reads of any size, down to one byte per call, across
//!     a grid of pull sizes;
//!   - line reads, with and without a trailing terminator;
//!   - whole-stream reads, with and without the decompression stage.
//!
//! The grid tests are the load-bearing ones: they prove the pending
//! buffer never reorders, drops or duplicates bytes at any chunk
//! boundary alignment.

use std::io::Cursor;

use sym_reader::{Reader, ReaderOptions};
use sym_tests::{
    compress, encrypt128, encrypt256, sym_payload, test_registry, AES128_KEY, IV,
};

fn reader_over(payload: Vec<u8>, options: ReaderOptions) -> Reader<'static> {
    Reader::new(Cursor::new(payload), &test_registry(), options).unwrap()
}

// ── Byte-count reads ─────────────────────────────────────────────────────────

#[test]
fn read_bytes_reassembles_plaintext_across_the_grid() {
    let plaintext: Vec<u8> = (0u16..2048).map(|i| (i % 251) as u8).collect();

    for buffer_size in [1, 2, 3, 5, 16, 17, 64, 4096] {
        for request in [1, 2, 3, 7, 64, 1000] {
            let payload = sym_payload(1, false, &encrypt128(&plaintext));
            let mut reader = reader_over(
                payload,
                ReaderOptions {
                    buffer_size,
                    ..ReaderOptions::default()
                },
            );

            let mut out = Vec::new();
            while let Some(bytes) = reader.read_bytes(request).unwrap() {
                out.extend(bytes);
            }
            assert_eq!(
                out, plaintext,
                "buffer_size={buffer_size} request={request}"
            );
            assert!(reader.is_eof());
        }
    }
}

#[test]
fn mixed_read_sizes_reassemble_plaintext() {
    let plaintext = b"interleaved read sizes should not matter at all".to_vec();
    let payload = sym_payload(1, false, &encrypt128(&plaintext));
    let mut reader = reader_over(
        payload,
        ReaderOptions {
            buffer_size: 7,
            ..ReaderOptions::default()
        },
    );

    let mut out = Vec::new();
    for request in [5, 0, 1, 13, 0, 2].iter().cycle() {
        match reader.read_bytes(*request).unwrap() {
            Some(bytes) if bytes.is_empty() && *request == 0 => continue,
            Some(bytes) => out.extend(bytes),
            None => break,
        }
    }
    assert_eq!(out, plaintext);
}

#[test]
fn hello_world_buffered_scenario() {
    let payload = sym_payload(1, false, &encrypt128(b"HelloWorld"));
    let mut reader = reader_over(
        payload,
        ReaderOptions {
            buffer_size: 4,
            ..ReaderOptions::default()
        },
    );

    assert_eq!(reader.read_bytes(3).unwrap().unwrap(), b"Hel");
    assert_eq!(reader.read_bytes(3).unwrap().unwrap(), b"loW");
    assert_eq!(reader.read_to_end().unwrap(), b"orld");
    assert!(reader.is_eof());
}

// ── Line reads ───────────────────────────────────────────────────────────────

#[test]
fn line_reads_reassemble_plaintext_including_unterminated_tail() {
    let plaintext = b"first\nsecond\nthird without newline".to_vec();

    for buffer_size in [1, 3, 8, 4096] {
        let payload = sym_payload(1, false, &encrypt128(&plaintext));
        let mut reader = reader_over(
            payload,
            ReaderOptions {
                buffer_size,
                ..ReaderOptions::default()
            },
        );

        let mut out = Vec::new();
        let mut count = 0;
        while let Some(line) = reader.read_line().unwrap() {
            out.extend(line);
            count += 1;
        }
        assert_eq!(out, plaintext, "buffer_size={buffer_size}");
        assert_eq!(count, 3);
    }
}

#[test]
fn lines_iterator_matches_manual_read_line() {
    let plaintext = b"a\nbb\nccc\n".to_vec();
    let payload = sym_payload(1, false, &encrypt128(&plaintext));
    let mut reader = reader_over(payload, ReaderOptions::default());

    let collected: Vec<Vec<u8>> = reader.lines().map(Result::unwrap).collect();
    assert_eq!(
        collected,
        vec![b"a\n".to_vec(), b"bb\n".to_vec(), b"ccc\n".to_vec()]
    );
}

// ── Header properties ────────────────────────────────────────────────────────

#[test]
fn header_bit_pattern_roundtrip() {
    for (version, compressed) in [(0u16, false), (1, false), (5, false), (5, true), (0x7FFF, true)]
    {
        let body: Vec<u8> = if compressed {
            compress(b"bits")
        } else {
            b"bits".to_vec()
        };
        let payload = sym_payload(version, compressed, &encrypt128(&body));

        // The wire bytes carry version | (compressed ? 0x8000 : 0),
        // big-endian, right after the magic.
        let expected_flags = version | if compressed { 0x8000 } else { 0 };
        assert_eq!(
            u16::from_be_bytes([payload[3], payload[4]]),
            expected_flags,
            "version={version} compressed={compressed}"
        );

        let mut registry = test_registry();
        if !registry.contains(version) {
            registry
                .register(
                    version,
                    sym_cipher::CipherSpec::new(
                        sym_cipher::Algorithm::Aes128Cbc,
                        AES128_KEY.to_vec(),
                        IV.to_vec(),
                    )
                    .unwrap(),
                )
                .unwrap();
        }

        let options = ReaderOptions {
            compress: compressed,
            ..ReaderOptions::default()
        };
        let mut reader = Reader::new(Cursor::new(payload), &registry, options).unwrap();
        assert_eq!(reader.version(), version);
        assert_eq!(reader.is_compressed(), Some(compressed));
        assert_eq!(reader.read_to_end().unwrap(), b"bits");
    }
}

#[test]
fn self_describing_stream_from_raw_bytes() {
    // magic "SYM", flags 0x0005 big-endian: version 5, not compressed.
    let mut payload = vec![b'S', b'Y', b'M', 0x00, 0x05];
    payload.extend_from_slice(&encrypt128(b"decrypted as the first block"));

    let mut reader = reader_over(payload, ReaderOptions::default());
    assert_eq!(reader.version(), 5);
    assert_eq!(reader.is_compressed(), Some(false));
    assert_eq!(reader.read_to_end().unwrap(), b"decrypted as the first block");
}

#[test]
fn headerless_stream_with_configured_version() {
    let payload = encrypt128(b"no header");
    let mut reader = reader_over(
        payload,
        ReaderOptions {
            version: Some(1),
            ..ReaderOptions::default()
        },
    );
    assert_eq!(reader.version(), 1);
    assert_eq!(reader.is_compressed(), None);
    assert_eq!(reader.read_to_end().unwrap(), b"no header");
}

// ── Cipher variants and composition ──────────────────────────────────────────

#[test]
fn aes256_roundtrip() {
    let plaintext = b"the 256-bit key path".to_vec();
    let payload = sym_payload(2, false, &encrypt256(&plaintext));
    let mut reader = reader_over(payload, ReaderOptions::default());
    assert_eq!(reader.version(), 2);
    assert_eq!(reader.read_to_end().unwrap(), plaintext);
}

#[test]
fn compressed_roundtrip() {
    let plaintext = b"zstd loves repetition ".repeat(500);
    let payload = sym_payload(1, true, &encrypt128(&compress(&plaintext)));

    let mut reader = reader_over(
        payload,
        ReaderOptions {
            compress: true,
            ..ReaderOptions::default()
        },
    );
    assert_eq!(reader.is_compressed(), Some(true));
    assert_eq!(reader.read_to_end().unwrap(), plaintext);
}

#[test]
fn compressed_line_reads() {
    let plaintext = b"log line one\nlog line two\nlog line three\n".repeat(100);
    let payload = sym_payload(1, true, &encrypt128(&compress(&plaintext)));

    let mut reader = reader_over(
        payload,
        ReaderOptions {
            compress: true,
            buffer_size: 32,
            ..ReaderOptions::default()
        },
    );
    let mut out = Vec::new();
    while let Some(line) = reader.read_line().unwrap() {
        out.extend(line);
    }
    assert_eq!(out, plaintext);
}

// ── File-backed sources ──────────────────────────────────────────────────────

fn temp_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("sym-roundtrip-{tag}-{}.sym", std::process::id()))
}

#[test]
fn open_reads_from_a_real_file() {
    let path = temp_path("open");
    std::fs::write(&path, sym_payload(5, false, &encrypt128(b"on disk"))).unwrap();

    let mut reader = Reader::open(&path, &test_registry(), ReaderOptions::default()).unwrap();
    assert_eq!(reader.version(), 5);
    assert_eq!(reader.read_to_end().unwrap(), b"on disk");
    drop(reader);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn with_releases_the_file_on_success_and_error() {
    let path = temp_path("with");
    std::fs::write(&path, sym_payload(1, false, &encrypt128(b"scoped\naccess"))).unwrap();

    let first = Reader::with(&path, &test_registry(), ReaderOptions::default(), |reader| {
        Ok(reader.read_line()?.unwrap())
    })
    .unwrap();
    assert_eq!(first, b"scoped\n");

    // A failing body must still release the file — the remove below
    // would fail on platforms with mandatory locks if it didn't.
    let result: Result<(), _> = Reader::with(
        &path,
        &test_registry(),
        ReaderOptions::default(),
        |_reader| {
            Err(sym_reader::ReadError::InvalidOptions {
                reason: "simulated failure".into(),
            })
        },
    );
    assert!(result.is_err());

    std::fs::remove_file(&path).unwrap();
}
