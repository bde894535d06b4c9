use sym_wire::MAX_VERSION;

use crate::error::ReadError;

/// Default size of each pull from the underlying source, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Construction options for a decrypting reader.
///
/// ```text
/// ┌─────────────┬─────────────────────────────────────────────────────┐
/// │ Field       │ Purpose                                             │
/// ├─────────────┼─────────────────────────────────────────────────────┤
/// │ version     │ Cipher version when the stream has no header        │
/// │ compress    │ Layer the zstd decompression stage over the output  │
/// │ buffer_size │ Size of each underlying pull (default 4096)         │
/// └─────────────┴─────────────────────────────────────────────────────┘
/// ```
///
/// `version` is consulted only when no header is present; a
/// self-describing stream always wins. When both the header and
/// `version` are absent, the registry's primary version is resolved —
/// and a registry without a primary is a construction error.
///
/// `compress` is a caller decision, independent of the header's
/// compressed flag: the flag reports what the producer wrote, the option
/// controls whether this reader decompresses.
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    /// Cipher version to resolve when the stream carries no header.
    pub version: Option<u16>,

    /// Wrap the decrypted output in a zstd decompression stage.
    pub compress: bool,

    /// Size of each chunk pulled from the underlying source.
    pub buffer_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            version: None,
            compress: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ReaderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject unusable configuration before any byte is read.
    pub(crate) fn validate(&self) -> Result<(), ReadError> {
        if self.buffer_size == 0 {
            return Err(ReadError::InvalidOptions {
                reason: "buffer_size must be at least 1".into(),
            });
        }
        if let Some(version) = self.version {
            if version > MAX_VERSION {
                return Err(ReadError::InvalidOptions {
                    reason: format!("version {version} exceeds the 15-bit maximum 0x7FFF"),
                });
            }
        }
        Ok(())
    }
}
