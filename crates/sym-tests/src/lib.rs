//! Test support for the SYM workspace: the write side of the stream
//! format.
//!
//! The product crates only ever *read* encrypted streams; every test
//! that wants realistic input needs the inverse. This library provides
//! it — AES-CBC/PKCS#7 encryption, header emission and zstd
//! pre-compression — so integration tests and benches can fabricate
//! streams and assert that reading them back reproduces the original
//! plaintext.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128Enc, Aes256Enc, Block};
use sym_cipher::{Algorithm, CipherRegistry, CipherSpec};
use sym_wire::{HEADER_SIZE, StreamHeader};

/// Fixed key material used across the integration suites.
pub const AES128_KEY: [u8; 16] = [0x42; 16];
pub const AES256_KEY: [u8; 32] = [0x24; 32];
pub const IV: [u8; 16] = [0x07; 16];

enum BlockEnc {
    Aes128(Aes128Enc),
    Aes256(Aes256Enc),
}

impl BlockEnc {
    fn encrypt_block(&self, block: &mut Block) {
        match self {
            BlockEnc::Aes128(cipher) => cipher.encrypt_block(block),
            BlockEnc::Aes256(cipher) => cipher.encrypt_block(block),
        }
    }
}

/// AES-CBC encrypt `plaintext` with PKCS#7 padding.
///
/// The inverse of the product's `CbcDecryptor`. Padding is always
/// appended (a full padding block when the plaintext is block-aligned,
/// including empty plaintext), so the output is a whole number of blocks
/// and never empty. For a stream with literally zero ciphertext bytes,
/// use [`empty_ciphertext`].
#[must_use]
pub fn encrypt(algorithm: Algorithm, key: &[u8], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    let cipher = match algorithm {
        Algorithm::Aes128Cbc => BlockEnc::Aes128(Aes128Enc::new_from_slice(key).unwrap()),
        Algorithm::Aes256Cbc => BlockEnc::Aes256(Aes256Enc::new_from_slice(key).unwrap()),
    };

    let pad = 16 - plaintext.len() % 16;
    let mut padded = plaintext.to_vec();
    padded.resize(plaintext.len() + pad, u8::try_from(pad).unwrap());

    let mut prev = *iv;
    let mut out = Vec::with_capacity(padded.len());
    for chunk in padded.chunks_exact(16) {
        let mut block = [0u8; 16];
        for i in 0..16 {
            block[i] = chunk[i] ^ prev[i];
        }
        let mut block = Block::from(block);
        cipher.encrypt_block(&mut block);
        prev.copy_from_slice(block.as_slice());
        out.extend_from_slice(block.as_slice());
    }
    out
}

/// Encrypt with the fixed AES-128 test key.
#[must_use]
pub fn encrypt128(plaintext: &[u8]) -> Vec<u8> {
    encrypt(Algorithm::Aes128Cbc, &AES128_KEY, &IV, plaintext)
}

/// Encrypt with the fixed AES-256 test key.
#[must_use]
pub fn encrypt256(plaintext: &[u8]) -> Vec<u8> {
    encrypt(Algorithm::Aes256Cbc, &AES256_KEY, &IV, plaintext)
}

/// A stream with zero ciphertext bytes — decrypts to empty plaintext
/// purely out of `finalize`.
#[must_use]
pub fn empty_ciphertext() -> Vec<u8> {
    Vec::new()
}

/// Prefix ciphertext with a SYM header for `version`/`compressed`.
///
/// # Panics
///
/// Panics if `version` does not fit the 15 version bits — test inputs
/// are expected to be valid.
#[must_use]
pub fn sym_payload(version: u16, compressed: bool, ciphertext: &[u8]) -> Vec<u8> {
    let mut payload = vec![0u8; HEADER_SIZE];
    StreamHeader::new(version, compressed)
        .unwrap()
        .write_to(&mut payload)
        .unwrap();
    payload.extend_from_slice(ciphertext);
    payload
}

/// zstd-compress plaintext for compressed-stream fabrication.
#[must_use]
pub fn compress(plaintext: &[u8]) -> Vec<u8> {
    zstd::encode_all(std::io::Cursor::new(plaintext), 0).unwrap()
}

/// Registry used across the integration suites:
///
/// ```text
///   version 1 → AES-128-CBC (fixed test key)
///   version 2 → AES-256-CBC (fixed test key)
///   version 5 → AES-128-CBC (fixed test key)
/// ```
///
/// No primary is marked — suites that exercise the primary fallback add
/// their own.
#[must_use]
pub fn test_registry() -> CipherRegistry {
    let mut registry = CipherRegistry::new();
    registry
        .register(
            1,
            CipherSpec::new(Algorithm::Aes128Cbc, AES128_KEY.to_vec(), IV.to_vec()).unwrap(),
        )
        .unwrap();
    registry
        .register(
            2,
            CipherSpec::new(Algorithm::Aes256Cbc, AES256_KEY.to_vec(), IV.to_vec()).unwrap(),
        )
        .unwrap();
    registry
        .register(
            5,
            CipherSpec::new(Algorithm::Aes128Cbc, AES128_KEY.to_vec(), IV.to_vec()).unwrap(),
        )
        .unwrap();
    registry
}
