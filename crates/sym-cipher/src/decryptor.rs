use crate::error::CipherError;

/// An incremental decrypt primitive.
///
/// A `Decryptor` is a stateful session consuming ciphertext chunks and
/// emitting plaintext as soon as it can be recovered. Block ciphers
/// cannot always emit a chunk's worth of plaintext immediately — the
/// session may buffer partial blocks and withhold the last block until
/// it knows whether more input follows — so the byte counts of `update`
/// inputs and outputs are unrelated.
///
/// # Session protocol
///
/// ```text
///   update(chunk)   zero or more times, once per chunk read from the
///                   source (empty chunks are allowed)
///   finalize()      exactly once, when the source reports no more
///                   data; emits any trailing plaintext the session
///                   was withholding
/// ```
///
/// Calling `update` after `finalize`, or `finalize` twice, is a caller
/// bug — the reader that owns the session tracks end-of-source and
/// finalizes once. Implementations are free to panic (debug assertions)
/// on protocol violations.
pub trait Decryptor {
    /// Absorb one ciphertext chunk and return whatever plaintext became
    /// available.
    ///
    /// An empty return does not mean the stream ended — it means the
    /// session is holding state back (partial block, padding candidate)
    /// until more input or `finalize` arrives.
    ///
    /// # Errors
    ///
    /// Returns a [`CipherError`] when the accumulated ciphertext is not
    /// decryptable; decryption is not resumable after an error.
    fn update(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Terminate the session and return the trailing plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::TruncatedCiphertext`] if the stream ended
    /// mid-block, or [`CipherError::InvalidPadding`] if the final block's
    /// padding fails validation (wrong key material or corrupt stream).
    fn finalize(&mut self) -> Result<Vec<u8>, CipherError>;
}
