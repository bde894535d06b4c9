use std::io;

use sym_cipher::CipherError;
use sym_wire::WireError;

/// Errors that can occur while constructing or consuming a decrypting
/// reader.
///
/// Construction validates at three levels — options, header, cipher
/// resolution — and read calls add underlying I/O and decryption
/// failures. Nothing is retried: decryption is not resumable across an
/// I/O failure mid-stream, so callers reopen and restart.
///
/// Error hierarchy:
///
/// ```text
///   ReadError
///   ├── InvalidOptions          ← bad configuration value, fails at construction
///   ├── Header(WireError)       ← magic present but flags truncated, bad version
///   ├── Cipher(CipherError)     ← version not registered / no primary (at
///   │                             construction); bad padding, truncated
///   │                             ciphertext (at end of stream)
///   └── Io(std::io::Error)      ← from the underlying source, propagated
///                                 unchanged
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// A configuration value was rejected.
    ///
    /// Raised before any byte is read from the source: zero
    /// `buffer_size`, a `version` the flags field could not encode, an
    /// empty line separator.
    #[error("invalid reader options: {reason}")]
    InvalidOptions { reason: String },

    /// The stream claims to carry a header but could not deliver one.
    #[error("invalid stream header: {0}")]
    Header(#[from] WireError),

    /// A cipher resolution or decryption error.
    ///
    /// Resolution failures ([`CipherError::NotFound`],
    /// [`CipherError::NoPrimary`]) surface at construction, never at
    /// first read.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// An I/O error from the underlying source.
    #[error(transparent)]
    Io(#[from] io::Error),
}
