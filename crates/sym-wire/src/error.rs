/// Errors raised while reading or writing the SYM stream header.
///
/// A missing header is *not* an error — `StreamHeader::detect` reports
/// absence as `Ok(None)` so the caller can fall back to an out-of-band
/// cipher version. These variants only cover streams that claim to carry
/// a header (magic present) but cannot deliver one, and attempts to
/// encode an unrepresentable header.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The magic prefix was present but the input ended before the
    /// 2-byte flags field could be read.
    ///
    /// The offset context tells the caller how many bytes were actually
    /// available. This happens on truncated files and on sources shorter
    /// than 5 bytes that begin with the magic.
    #[error("stream starts with magic but ends at {have} bytes, header needs {need}")]
    UnexpectedEof { have: usize, need: usize },

    /// A version outside the 15-bit range was supplied.
    ///
    /// Bit 15 of the flags field is the compressed flag, so versions are
    /// limited to 0..=0x7FFF. Decoding can never produce this — only
    /// header construction with a bad version.
    #[error("cipher version {version} exceeds the 15-bit maximum 0x7FFF")]
    VersionOutOfRange { version: u16 },
}
