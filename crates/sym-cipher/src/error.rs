use crate::registry::Algorithm;

/// Errors from cipher resolution and incremental decryption.
///
/// Resolution errors (`NotFound`, `NoPrimary`, `VersionOutOfRange`,
/// key/IV length checks) surface when a reader is constructed — never on
/// a later read. Decryption errors (`TruncatedCiphertext`,
/// `InvalidPadding`) surface from `update`/`finalize` while the stream
/// is consumed.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// The resolved version has no registered cipher.
    ///
    /// Fatal and not retried — the registry is fixed for the lifetime of
    /// the reader, so the same lookup can never start succeeding.
    #[error("no cipher registered for version {version}")]
    NotFound { version: u16 },

    /// No header was present, no version was configured, and the
    /// registry has no primary version to fall back to.
    #[error("registry has no primary cipher version")]
    NoPrimary,

    /// A version outside the wire format's 15-bit range was registered.
    ///
    /// Header flags can only encode versions up to
    /// [`sym_wire::MAX_VERSION`], so a larger registration could never be
    /// resolved from a self-describing stream.
    #[error("cipher version {version} exceeds the wire maximum 0x7FFF")]
    VersionOutOfRange { version: u16 },

    /// Key material of the wrong length for the chosen algorithm.
    #[error("{algorithm} needs a {need}-byte key, got {have} bytes")]
    InvalidKeyLength {
        algorithm: Algorithm,
        have: usize,
        need: usize,
    },

    /// Initialization vector of the wrong length for the chosen algorithm.
    #[error("{algorithm} needs a {need}-byte IV, got {have} bytes")]
    InvalidIvLength {
        algorithm: Algorithm,
        have: usize,
        need: usize,
    },

    /// The stream ended with a partial cipher block outstanding.
    ///
    /// CBC ciphertext is always a whole number of blocks; trailing bytes
    /// mean the stream was cut mid-block or was never this cipher's
    /// output.
    #[error("ciphertext ends mid-block ({trailing} trailing bytes)")]
    TruncatedCiphertext { trailing: usize },

    /// The final block did not carry valid padding after decryption.
    ///
    /// Wrong key, wrong IV, and corrupted ciphertext all land here —
    /// the padding bytes are the only integrity signal this cipher mode
    /// has.
    #[error("invalid block padding in final cipher block")]
    InvalidPadding,
}
