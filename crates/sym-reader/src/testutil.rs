//! Shared fixtures for this crate's unit tests: a fixed-key AES-128-CBC
//! encryptor (the inverse of the production pipeline), header framing
//! and a pre-populated registry.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128Enc, Block};
use sym_cipher::{Algorithm, CipherRegistry, CipherSpec};
use sym_wire::{HEADER_SIZE, StreamHeader};

pub const KEY: [u8; 16] = [0x11; 16];
pub const IV: [u8; 16] = [0x22; 16];

/// AES-128-CBC + PKCS#7 encryption with the fixed test key material.
pub fn encrypt(plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes128Enc::new_from_slice(&KEY).unwrap();

    let pad = 16 - plaintext.len() % 16;
    let mut padded = plaintext.to_vec();
    padded.resize(plaintext.len() + pad, pad as u8);

    let mut prev = IV;
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

/// Prefix ciphertext with a SYM header.
pub fn with_header(version: u16, compressed: bool, ciphertext: &[u8]) -> Vec<u8> {
    let mut payload = vec![0u8; HEADER_SIZE];
    StreamHeader::new(version, compressed)
        .unwrap()
        .write_to(&mut payload)
        .unwrap();
    payload.extend_from_slice(ciphertext);
    payload
}

/// Registry with versions 1, 3 and 5, all mapped to the test key.
pub fn registry() -> CipherRegistry {
    let mut registry = CipherRegistry::new();
    for version in [1, 3, 5] {
        registry
            .register(
                version,
                CipherSpec::new(Algorithm::Aes128Cbc, KEY.to_vec(), IV.to_vec()).unwrap(),
            )
            .unwrap();
    }
    registry
}
