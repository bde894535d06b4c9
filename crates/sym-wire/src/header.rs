use crate::error::WireError;

/// Magic prefix: ASCII "SYM".
/// Stored as raw bytes rather than an integer so byte order never enters
/// the picture — a self-describing stream always begins with exactly
/// these 3 bytes in this order.
pub const SYM_MAGIC: [u8; 3] = [0x53, 0x59, 0x4D];

/// Total header size in bytes (fixed): magic + flags.
pub const HEADER_SIZE: usize = 5;

/// Highest representable cipher version (bits 0-14 of the flags field).
pub const MAX_VERSION: u16 = 0x7FFF;

/// Header flags field — a 16-bit big-endian value packed after the magic.
///
/// Bit layout:
///   bit 15   = compressed (plaintext is a zstd stream)
///   bits 0-14 = cipher version number
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamFlags(u16);

impl StreamFlags {
    /// The plaintext under the encryption layer is compressed.
    pub const COMPRESSED: Self = Self(0x8000);

    /// Create flags from a raw 16-bit value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Pack a version number and compressed flag into a flags value.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::VersionOutOfRange`] if `version` does not fit
    /// in the 15 version bits.
    pub fn pack(version: u16, compressed: bool) -> Result<Self, WireError> {
        if version > MAX_VERSION {
            return Err(WireError::VersionOutOfRange { version });
        }
        let mut raw = version;
        if compressed {
            raw |= Self::COMPRESSED.0;
        }
        Ok(Self(raw))
    }

    /// Get the underlying 16-bit value.
    #[must_use]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// The cipher version encoded in bits 0-14.
    #[must_use]
    pub fn version(self) -> u16 {
        self.0 & MAX_VERSION
    }

    #[must_use]
    pub fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED.0 != 0
    }
}

/// SYM stream header — the first 5 bytes of a self-describing encrypted
/// stream.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────┐
/// │ Offset │ Size    │ Description                      │
/// ├────────┼─────────┼──────────────────────────────────┤
/// │ 0x00   │ 3 bytes │ Magic: "SYM" (0x53 0x59 0x4D)    │
/// │ 0x03   │ 2 bytes │ Flags, big-endian:               │
/// │        │         │   bit 15   = compressed          │
/// │        │         │   bits 0-14 = cipher version     │
/// └────────┴─────────┴──────────────────────────────────┘
/// ```
///
/// The header is optional on the wire. Streams written before the
/// self-describing format, or by producers that keep the version
/// out-of-band, start directly with ciphertext — detection therefore
/// distinguishes "no header" (fall back to caller configuration) from
/// "broken header" (magic present, flags missing).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    pub version: u16,
    pub compressed: bool,
}

impl StreamHeader {
    /// Create a header for the given cipher version and compression flag.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::VersionOutOfRange`] if `version` exceeds
    /// [`MAX_VERSION`].
    pub fn new(version: u16, compressed: bool) -> Result<Self, WireError> {
        if version > MAX_VERSION {
            return Err(WireError::VersionOutOfRange { version });
        }
        Ok(Self {
            version,
            compressed,
        })
    }

    /// The packed flags field for this header.
    #[must_use]
    pub fn flags(&self) -> StreamFlags {
        let mut raw = self.version;
        if self.compressed {
            raw |= StreamFlags::COMPRESSED.raw();
        }
        StreamFlags::from_raw(raw)
    }

    /// Look for a header at the start of the first chunk read from a
    /// source.
    ///
    /// Returns `Ok(Some(header))` when the chunk begins with the magic
    /// and carries a complete flags field; the ciphertext then starts at
    /// byte [`HEADER_SIZE`]. Returns `Ok(None)` when the chunk does not
    /// begin with the magic (including chunks shorter than the magic
    /// itself) — the entire chunk is ciphertext and the cipher version
    /// must come from elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] when the magic is present but
    /// the chunk ends before the flags field — a stream that claims to be
    /// self-describing must deliver the whole header.
    pub fn detect(chunk: &[u8]) -> Result<Option<Self>, WireError> {
        if chunk.len() < SYM_MAGIC.len() || chunk[..SYM_MAGIC.len()] != SYM_MAGIC {
            return Ok(None);
        }
        if chunk.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof {
                have: chunk.len(),
                need: HEADER_SIZE,
            });
        }
        let flags = StreamFlags::from_raw(u16::from_be_bytes([chunk[3], chunk[4]]));
        Ok(Some(Self {
            version: flags.version(),
            compressed: flags.is_compressed(),
        }))
    }

    /// Write the 5 header bytes into the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`HEADER_SIZE`].
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof {
                have: buf.len(),
                need: HEADER_SIZE,
            });
        }
        buf[0..3].copy_from_slice(&SYM_MAGIC);
        buf[3..5].copy_from_slice(&self.flags().raw().to_be_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_plain_header() {
        let header = StreamHeader::new(5, false).unwrap();
        let mut buf = [0u8; HEADER_SIZE];
        header.write_to(&mut buf).unwrap();
        let parsed = StreamHeader::detect(&buf).unwrap().unwrap();
        assert_eq!(header, parsed);
    }

    #[test]
    fn roundtrip_compressed_header() {
        let header = StreamHeader::new(12, true).unwrap();
        let mut buf = [0u8; HEADER_SIZE];
        header.write_to(&mut buf).unwrap();
        let parsed = StreamHeader::detect(&buf).unwrap().unwrap();
        assert!(parsed.compressed);
        assert_eq!(parsed.version, 12);
    }

    #[test]
    fn magic_bytes_are_correct() {
        let header = StreamHeader::new(0, false).unwrap();
        let mut buf = [0u8; HEADER_SIZE];
        header.write_to(&mut buf).unwrap();
        assert_eq!(&buf[0..3], b"SYM");
    }

    #[test]
    fn flags_pack_matches_bit_pattern() {
        let flags = StreamFlags::pack(5, false).unwrap();
        assert_eq!(flags.raw(), 0x0005);

        let flags = StreamFlags::pack(5, true).unwrap();
        assert_eq!(flags.raw(), 0x8005);
        assert_eq!(flags.version(), 5);
        assert!(flags.is_compressed());
    }

    #[test]
    fn version_uses_all_fifteen_bits() {
        let flags = StreamFlags::pack(MAX_VERSION, true).unwrap();
        assert_eq!(flags.raw(), 0xFFFF);
        assert_eq!(flags.version(), MAX_VERSION);
    }

    #[test]
    fn reject_version_overflow() {
        assert!(matches!(
            StreamFlags::pack(0x8000, false),
            Err(WireError::VersionOutOfRange { version: 0x8000 })
        ));
        assert!(matches!(
            StreamHeader::new(0xFFFF, false),
            Err(WireError::VersionOutOfRange { .. })
        ));
    }

    #[test]
    fn no_magic_is_not_a_header() {
        assert!(StreamHeader::detect(b"ciphertext").unwrap().is_none());
    }

    #[test]
    fn short_chunk_without_magic_is_not_a_header() {
        assert!(StreamHeader::detect(b"SY").unwrap().is_none());
        assert!(StreamHeader::detect(b"").unwrap().is_none());
    }

    #[test]
    fn magic_with_truncated_flags_is_an_error() {
        let result = StreamHeader::detect(b"SYM\x00");
        assert!(matches!(
            result,
            Err(WireError::UnexpectedEof { have: 4, need: 5 })
        ));
    }

    #[test]
    fn detect_ignores_trailing_ciphertext() {
        let mut buf = vec![0u8; HEADER_SIZE];
        StreamHeader::new(3, false).unwrap().write_to(&mut buf).unwrap();
        buf.extend_from_slice(&[0xAA; 32]);
        let parsed = StreamHeader::detect(&buf).unwrap().unwrap();
        assert_eq!(parsed.version, 3);
        assert!(!parsed.compressed);
    }

    #[test]
    fn write_to_short_buffer_is_an_error() {
        let header = StreamHeader::new(1, false).unwrap();
        let mut buf = [0u8; 3];
        assert!(matches!(
            header.write_to(&mut buf),
            Err(WireError::UnexpectedEof { have: 3, need: 5 })
        ));
    }
}
