use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bytes::BytesMut;

use sym_cipher::CipherRegistry;

use crate::error::ReadError;
use crate::options::ReaderOptions;
use crate::stream::DecryptStream;

/// Buffered byte/line-oriented reader over an encrypted stream.
///
/// `Reader` is the primary API of this workspace: it wraps a
/// [`DecryptStream`] (and, when the `compress` option is set, a zstd
/// decompression stage over it), holds decrypted-but-undelivered
/// plaintext in a pending buffer, and serves byte-count reads, line
/// reads and end-of-stream detection from that buffer.
///
/// ```text
///   source ──▶ DecryptStream ──(zstd?)──▶ pending buffer ──▶ caller
///                 decrypts        inflates    split_to(n)
/// ```
///
/// Operations:
///
/// ```text
/// ┌──────────────────┬────────────────────────────────────────────────┐
/// │ read_bytes(n)    │ exactly n bytes, fewer at the end; None at eof │
/// │ read_to_end()    │ everything that remains, in one call           │
/// │ read_until(sep)  │ through the first sep (inclusive); None at eof │
/// │ read_line()      │ read_until(b"\n")                              │
/// │ lines()          │ lazy iterator of read_line results             │
/// │ is_eof()         │ pending empty AND source exhausted             │
/// └──────────────────┴────────────────────────────────────────────────┘
/// ```
///
/// The pending buffer delivers bytes strictly in arrival order — it
/// never reorders or drops. A non-empty pending buffer with an exhausted
/// source is *not* end of stream; `None` results appear only once both
/// are drained.
///
/// # Ownership of the source
///
/// The reader takes the source by value and drops (closes) it when the
/// reader itself is dropped, on every exit path. To keep ownership,
/// pass the source by mutable reference — `&mut S` is also `io::Read` —
/// and the reader will leave it open.
///
/// # Example
///
/// ```rust,no_run
/// use sym_cipher::CipherRegistry;
/// use sym_reader::{Reader, ReaderOptions};
///
/// fn first_line(registry: &CipherRegistry) -> Result<Vec<u8>, sym_reader::ReadError> {
///     Reader::with("data.sym", registry, ReaderOptions::default(), |reader| {
///         Ok(reader.read_line()?.unwrap_or_default())
///     })
/// }
/// ```
pub struct Reader<'s> {
    inner: Box<dyn Read + 's>,
    pending: BytesMut,
    buffer_size: usize,
    inner_done: bool,
    version: u16,
    compressed: Option<bool>,
}

impl<'s> Reader<'s> {
    /// Construct a reader over any byte source.
    ///
    /// Primes the decrypt stream (header detection, cipher resolution,
    /// first block decryption) and, when `options.compress` is set,
    /// layers the zstd decompression stage over the decrypted output —
    /// decryption always precedes decompression.
    ///
    /// # Errors
    ///
    /// Everything [`DecryptStream::new`] raises, plus an
    /// [`ReadError::Io`] if the zstd stage cannot be initialised.
    pub fn new<S: Read + 's>(
        source: S,
        registry: &CipherRegistry,
        options: ReaderOptions,
    ) -> Result<Self, ReadError> {
        let stream = DecryptStream::new(source, registry, &options)?;
        let version = stream.version();
        let compressed = stream.compressed();

        let inner: Box<dyn Read + 's> = if options.compress {
            Box::new(zstd::Decoder::new(stream)?)
        } else {
            Box::new(stream)
        };

        Ok(Self {
            inner,
            pending: BytesMut::new(),
            buffer_size: options.buffer_size,
            inner_done: false,
            version,
            compressed,
        })
    }

    /// The cipher version established at construction (header, option or
    /// registry primary). Stable for the lifetime of the reader.
    #[must_use]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The header's compressed flag: `Some(bool)` for self-describing
    /// streams, `None` (unknown) when no header was present — regardless
    /// of whether the `compress` option forced the decompression stage
    /// on.
    #[must_use]
    pub fn is_compressed(&self) -> Option<bool> {
        self.compressed
    }

    /// True iff the pending buffer is empty AND the stream has reported
    /// exhaustion.
    ///
    /// Exhaustion is only observable by reading, so this reports the
    /// state established by reads so far — it never reads ahead to find
    /// out.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pending.is_empty() && self.inner_done
    }

    /// Pull one chunk from the inner stream into the pending buffer.
    fn pull(&mut self) -> Result<(), ReadError> {
        let start = self.pending.len();
        self.pending.resize(start + self.buffer_size, 0);
        match self.inner.read(&mut self.pending[start..]) {
            Ok(0) => {
                self.pending.truncate(start);
                self.inner_done = true;
            }
            Ok(n) => self.pending.truncate(start + n),
            Err(e) => {
                self.pending.truncate(start);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Read up to `n` bytes.
    ///
    /// `n == 0` returns an empty result immediately — no pull, no buffer
    /// advance. Otherwise pulls until the pending buffer holds `n` bytes
    /// or the stream is exhausted, then delivers at most `n` bytes from
    /// the front. A result shorter than `n` means the stream ended
    /// mid-request; that is not an error. `None` is the end-of-stream
    /// sentinel: nothing remained at all.
    ///
    /// # Errors
    ///
    /// [`ReadError::Io`] from the source; [`ReadError::Cipher`] failures
    /// surface as the `Io` variant's `InvalidData` once wrapped by the
    /// stream layer.
    pub fn read_bytes(&mut self, n: usize) -> Result<Option<Vec<u8>>, ReadError> {
        if n == 0 {
            return Ok(Some(Vec::new()));
        }
        while self.pending.len() < n && !self.inner_done {
            self.pull()?;
        }
        if self.pending.is_empty() {
            return Ok(None);
        }
        let take = n.min(self.pending.len());
        Ok(Some(self.pending.split_to(take).to_vec()))
    }

    /// Read everything that remains, draining the source to completion
    /// (and thereby finalizing the cipher) in one call.
    ///
    /// Returns an empty vector when the stream was already exhausted.
    ///
    /// # Errors
    ///
    /// Same as [`read_bytes`](Self::read_bytes).
    pub fn read_to_end(&mut self) -> Result<Vec<u8>, ReadError> {
        while !self.inner_done {
            self.pull()?;
        }
        let take = self.pending.len();
        Ok(self.pending.split_to(take).to_vec())
    }

    /// Read through and including the first occurrence of `separator`.
    ///
    /// Pulls until the pending buffer contains the separator or the
    /// stream is exhausted. If the stream ends without a separator, the
    /// entire remainder is the final (unterminated) line. `None` is the
    /// end-of-stream sentinel.
    ///
    /// # Errors
    ///
    /// [`ReadError::InvalidOptions`] for an empty separator, plus
    /// everything [`read_bytes`](Self::read_bytes) raises.
    pub fn read_until(&mut self, separator: &[u8]) -> Result<Option<Vec<u8>>, ReadError> {
        if separator.is_empty() {
            return Err(ReadError::InvalidOptions {
                reason: "line separator must not be empty".into(),
            });
        }
        let mut searched = 0;
        loop {
            if let Some(at) = find_from(&self.pending, separator, searched) {
                return Ok(Some(self.pending.split_to(at + separator.len()).to_vec()));
            }
            if self.inner_done {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let take = self.pending.len();
                return Ok(Some(self.pending.split_to(take).to_vec()));
            }
            // Bytes already scanned cannot start a match, except the
            // tail that might straddle the next pull.
            searched = self.pending.len().saturating_sub(separator.len() - 1);
            self.pull()?;
        }
    }

    /// Read one `\n`-terminated line (inclusive).
    ///
    /// # Errors
    ///
    /// Same as [`read_until`](Self::read_until).
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>, ReadError> {
        self.read_until(b"\n")
    }

    /// Lazy iterator of `\n`-terminated lines.
    ///
    /// Forward-only and finite: iteration consumes the stream and ends
    /// at end of stream; it is not restartable. Separators stay attached
    /// to their lines, so concatenating every item reproduces the
    /// plaintext exactly.
    pub fn lines(&mut self) -> Lines<'_, 's> {
        self.lines_with(b"\n".to_vec())
    }

    /// [`lines`](Self::lines) with a custom separator sequence.
    pub fn lines_with(&mut self, separator: impl Into<Vec<u8>>) -> Lines<'_, 's> {
        Lines {
            reader: self,
            separator: separator.into(),
        }
    }
}

impl Reader<'static> {
    /// Open a file at `path` and construct a reader over it.
    ///
    /// The file is opened read-only, owned by the reader, and closed
    /// when the reader is dropped.
    ///
    /// # Errors
    ///
    /// [`ReadError::Io`] if the file cannot be opened, plus everything
    /// [`new`](Self::new) raises.
    pub fn open(
        path: impl AsRef<Path>,
        registry: &CipherRegistry,
        options: ReaderOptions,
    ) -> Result<Self, ReadError> {
        let file = File::open(path)?;
        Self::new(file, registry, options)
    }

    /// Open a file, run `body` with the reader, and release the file on
    /// every exit path — including when `body` or the open itself fails.
    ///
    /// # Errors
    ///
    /// Everything [`open`](Self::open) raises, or whatever `body`
    /// returns.
    pub fn with<T>(
        path: impl AsRef<Path>,
        registry: &CipherRegistry,
        options: ReaderOptions,
        body: impl FnOnce(&mut Reader<'static>) -> Result<T, ReadError>,
    ) -> Result<T, ReadError> {
        let mut reader = Self::open(path, registry, options)?;
        body(&mut reader)
    }
}

/// The reader is itself a byte source, so further `io::Read`-consuming
/// transforms can wrap it the same way the zstd stage wraps the decrypt
/// stream.
impl Read for Reader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pending.is_empty() {
            if self.inner_done {
                return Ok(0);
            }
            let n = self.inner.read(buf)?;
            if n == 0 {
                self.inner_done = true;
            }
            return Ok(n);
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending.split_to(n));
        Ok(n)
    }
}

/// Iterator returned by [`Reader::lines`] / [`Reader::lines_with`].
pub struct Lines<'r, 's> {
    reader: &'r mut Reader<'s>,
    separator: Vec<u8>,
}

impl Iterator for Lines<'_, '_> {
    type Item = Result<Vec<u8>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_until(&self.separator).transpose()
    }
}

/// First occurrence of `needle` in `haystack` at or after `from`.
fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&i| &haystack[i..i + needle.len()] == needle)
}
