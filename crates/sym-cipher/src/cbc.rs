use aes::cipher::{BlockDecrypt, KeyInit};
use aes::{Aes128Dec, Aes256Dec, Block};

use crate::decryptor::Decryptor;
use crate::error::CipherError;
use crate::registry::Algorithm;

/// AES block size in bytes (both key sizes).
pub const BLOCK_SIZE: usize = 16;

/// The concrete AES decrypt core behind a [`CbcDecryptor`].
enum BlockCipher {
    Aes128(Aes128Dec),
    Aes256(Aes256Dec),
}

impl BlockCipher {
    fn decrypt_block(&self, block: &mut Block) {
        match self {
            BlockCipher::Aes128(cipher) => cipher.decrypt_block(block),
            BlockCipher::Aes256(cipher) => cipher.decrypt_block(block),
        }
    }
}

/// Incremental AES-CBC decryption with PKCS#7 padding.
///
/// The session keeps three pieces of block-boundary state:
///
/// ```text
///   prev     last ciphertext block seen (the IV before any input) —
///            the CBC chaining value
///   partial  buffered ciphertext smaller than one block
///   held     the most recent *decrypted* block, withheld from output
/// ```
///
/// The hold-back is what makes the stream protocol work: the final
/// ciphertext block carries padding that must be stripped, but mid-stream
/// nothing distinguishes it from any other block. So `update` always
/// stays one decrypted block behind its input, and `finalize` validates
/// and strips the padding from the held block — this is exactly the
/// trailing output the reader appends after the last `update`.
pub struct CbcDecryptor {
    cipher: BlockCipher,
    prev: [u8; BLOCK_SIZE],
    partial: Vec<u8>,
    held: Option<[u8; BLOCK_SIZE]>,
    finalized: bool,
}

impl CbcDecryptor {
    /// Create an AES-128-CBC session.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] /
    /// [`CipherError::InvalidIvLength`] for material of the wrong size.
    pub fn aes128(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        let cipher = Aes128Dec::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
            algorithm: Algorithm::Aes128Cbc,
            have: key.len(),
            need: 16,
        })?;
        Self::with_cipher(BlockCipher::Aes128(cipher), Algorithm::Aes128Cbc, iv)
    }

    /// Create an AES-256-CBC session.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] /
    /// [`CipherError::InvalidIvLength`] for material of the wrong size.
    pub fn aes256(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        let cipher = Aes256Dec::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
            algorithm: Algorithm::Aes256Cbc,
            have: key.len(),
            need: 32,
        })?;
        Self::with_cipher(BlockCipher::Aes256(cipher), Algorithm::Aes256Cbc, iv)
    }

    fn with_cipher(
        cipher: BlockCipher,
        algorithm: Algorithm,
        iv: &[u8],
    ) -> Result<Self, CipherError> {
        if iv.len() != BLOCK_SIZE {
            return Err(CipherError::InvalidIvLength {
                algorithm,
                have: iv.len(),
                need: BLOCK_SIZE,
            });
        }
        let mut prev = [0u8; BLOCK_SIZE];
        prev.copy_from_slice(iv);
        Ok(Self {
            cipher,
            prev,
            partial: Vec::new(),
            held: None,
            finalized: false,
        })
    }
}

fn xor_blocks(cipher_out: &[u8], chain: &[u8; BLOCK_SIZE], out: &mut [u8; BLOCK_SIZE]) {
    for i in 0..BLOCK_SIZE {
        out[i] = cipher_out[i] ^ chain[i];
    }
}

impl Decryptor for CbcDecryptor {
    fn update(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        debug_assert!(!self.finalized, "update after finalize");

        self.partial.extend_from_slice(ciphertext);
        let whole = self.partial.len() - self.partial.len() % BLOCK_SIZE;
        if whole == 0 {
            return Ok(Vec::new());
        }
        let rest = self.partial.split_off(whole);
        let blocks = std::mem::replace(&mut self.partial, rest);

        let mut out = Vec::with_capacity(blocks.len());
        for chunk in blocks.chunks_exact(BLOCK_SIZE) {
            let mut ct = [0u8; BLOCK_SIZE];
            ct.copy_from_slice(chunk);

            let mut block = Block::from(ct);
            self.cipher.decrypt_block(&mut block);

            let mut plain = [0u8; BLOCK_SIZE];
            xor_blocks(block.as_slice(), &self.prev, &mut plain);

            // Emit the previously held block; the fresh one becomes the
            // new padding candidate.
            if let Some(ready) = self.held.replace(plain) {
                out.extend_from_slice(&ready);
            }
            self.prev = ct;
        }
        Ok(out)
    }

    fn finalize(&mut self) -> Result<Vec<u8>, CipherError> {
        debug_assert!(!self.finalized, "finalize called twice");
        self.finalized = true;

        if !self.partial.is_empty() {
            return Err(CipherError::TruncatedCiphertext {
                trailing: self.partial.len(),
            });
        }

        match self.held.take() {
            // Zero ciphertext blocks: an empty plaintext stream.
            None => Ok(Vec::new()),
            Some(last) => {
                let pad = last[BLOCK_SIZE - 1] as usize;
                if pad == 0 || pad > BLOCK_SIZE {
                    return Err(CipherError::InvalidPadding);
                }
                if last[BLOCK_SIZE - pad..].iter().any(|&b| b as usize != pad) {
                    return Err(CipherError::InvalidPadding);
                }
                Ok(last[..BLOCK_SIZE - pad].to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIST SP 800-38A, F.2.2 (CBC-AES128.Decrypt). Four blocks of
    // ciphertext and the matching plaintext, no padding — which is
    // exactly what the hold-back tests need: the "plaintext" of the
    // last block is not valid padding.
    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
    const IV: &str = "000102030405060708090a0b0c0d0e0f";
    const CIPHERTEXT: &str = "7649abac8119b246cee98e9b12e9197d\
                              5086cb9b507219ee95db113a917678b2\
                              73bed6b8e3c1743b7116e69e22229516\
                              3ff1caa1681fac09120eca307586e1a7";
    const PLAINTEXT: &str = "6bc1bee22e409f96e93d7e117393172a\
                             ae2d8a571e03ac9c9eb76fac45af8e51\
                             30c81c46a35ce411e5fbc1191a0a52ef\
                             f69f2445df4f9b17ad2b417be66c3710";

    fn nist_session() -> CbcDecryptor {
        CbcDecryptor::aes128(&hex::decode(KEY).unwrap(), &hex::decode(IV).unwrap()).unwrap()
    }

    #[test]
    fn update_holds_back_one_block() {
        let mut session = nist_session();
        let out = session.update(&hex::decode(CIPHERTEXT).unwrap()).unwrap();
        // All four blocks went in; three come out, the last is withheld
        // as the padding candidate.
        assert_eq!(out, hex::decode(PLAINTEXT).unwrap()[..48].to_vec());
    }

    #[test]
    fn single_block_emits_nothing_until_more_input() {
        let ct = hex::decode(CIPHERTEXT).unwrap();
        let mut session = nist_session();
        assert!(session.update(&ct[..16]).unwrap().is_empty());
        let out = session.update(&ct[16..32]).unwrap();
        assert_eq!(out, hex::decode(PLAINTEXT).unwrap()[..16].to_vec());
    }

    #[test]
    fn byte_at_a_time_matches_bulk_output() {
        let ct = hex::decode(CIPHERTEXT).unwrap();
        let mut session = nist_session();
        let mut out = Vec::new();
        for byte in &ct {
            out.extend(session.update(std::slice::from_ref(byte)).unwrap());
        }
        assert_eq!(out, hex::decode(PLAINTEXT).unwrap()[..48].to_vec());
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut session = nist_session();
        assert!(session.update(&[]).unwrap().is_empty());
        let out = session.update(&hex::decode(CIPHERTEXT).unwrap()).unwrap();
        assert_eq!(out.len(), 48);
    }

    #[test]
    fn finalize_rejects_nist_tail_as_padding() {
        // The last NIST plaintext block ends in 0x10 (= 16, a plausible
        // pad length) but the preceding bytes are not 0x10.
        let mut session = nist_session();
        session.update(&hex::decode(CIPHERTEXT).unwrap()).unwrap();
        assert!(matches!(
            session.finalize(),
            Err(CipherError::InvalidPadding)
        ));
    }

    #[test]
    fn finalize_rejects_partial_block() {
        let mut session = nist_session();
        session.update(&[0xAB; 10]).unwrap();
        assert!(matches!(
            session.finalize(),
            Err(CipherError::TruncatedCiphertext { trailing: 10 })
        ));
    }

    #[test]
    fn empty_stream_finalizes_to_empty_plaintext() {
        let mut session = nist_session();
        assert!(session.update(&[]).unwrap().is_empty());
        assert!(session.finalize().unwrap().is_empty());
    }

    #[test]
    fn reject_wrong_key_length() {
        let iv = [0u8; 16];
        assert!(matches!(
            CbcDecryptor::aes128(&[0u8; 15], &iv),
            Err(CipherError::InvalidKeyLength { have: 15, need: 16, .. })
        ));
        assert!(matches!(
            CbcDecryptor::aes256(&[0u8; 16], &iv),
            Err(CipherError::InvalidKeyLength { have: 16, need: 32, .. })
        ));
    }

    #[test]
    fn reject_wrong_iv_length() {
        assert!(matches!(
            CbcDecryptor::aes128(&[0u8; 16], &[0u8; 12]),
            Err(CipherError::InvalidIvLength { have: 12, need: 16, .. })
        ));
    }
}
