use std::io::{self, Read};

use sym_cipher::{CipherError, CipherRegistry, Decryptor};
use sym_wire::{HEADER_SIZE, StreamHeader};

use crate::error::ReadError;
use crate::options::ReaderOptions;

/// The decrypting layer of the read pipeline.
///
/// `DecryptStream` owns the underlying source and the cipher session and
/// implements [`io::Read`], yielding plaintext. Construction *primes*
/// the stream: the first chunk is read, the header (if any) is detected,
/// the cipher version is resolved against the registry — a failed lookup
/// is an immediate construction error, never deferred to a read — and
/// the chunk's ciphertext remainder goes through the session's first
/// `update`.
///
/// State transitions during reads:
///
/// ```text
///   primed ──pull/update──▶ reading ──source EOF──▶ finalize once ──▶ done
/// ```
///
/// Ordering is strict: chunk N's plaintext is fully served before chunk
/// N+1 is requested, and the `finalize` output always follows all
/// `update` output. The session's hold-back means an `update` can
/// legitimately return nothing — the read loop treats that as "pull
/// again", never as end of stream.
///
/// Anything downstream that needs decrypted bytes — the buffered
/// [`Reader`](crate::Reader), a zstd decoder, any other transform —
/// composes over this type through `io::Read` alone.
pub struct DecryptStream<S> {
    source: S,
    session: Box<dyn Decryptor>,
    version: u16,
    compressed: Option<bool>,
    /// Reusable chunk buffer; its length is the configured pull size.
    chunk: Vec<u8>,
    /// Decrypted bytes not yet copied out to a caller.
    carry: Vec<u8>,
    carry_pos: usize,
    source_done: bool,
    finalized: bool,
}

impl<S: Read> DecryptStream<S> {
    /// Open a decrypting stream over `source` and prime it.
    ///
    /// The priming read fills a whole chunk of `buffer_size` bytes — but
    /// never fewer than [`HEADER_SIZE`] — looping over short reads, so
    /// the magic and flags can never straddle a chunk boundary and
    /// detection does not depend on the pull size; sources shorter than
    /// one chunk simply fill less. When
    /// the chunk begins with the magic, the header supplies the version
    /// and compressed flag and the rest of the chunk is the first
    /// ciphertext block; otherwise the whole chunk is ciphertext and the
    /// version comes from `options.version`, falling back to the
    /// registry's primary version.
    ///
    /// # Errors
    ///
    /// - [`ReadError::InvalidOptions`] for unusable options.
    /// - [`ReadError::Header`] when the magic is present but the flags
    ///   field is truncated.
    /// - [`ReadError::Cipher`] when the resolved version has no
    ///   registered cipher, or no version could be resolved at all.
    /// - [`ReadError::Io`] from the priming read.
    pub fn new(
        mut source: S,
        registry: &CipherRegistry,
        options: &ReaderOptions,
    ) -> Result<Self, ReadError> {
        options.validate()?;

        let mut first = vec![0u8; options.buffer_size.max(HEADER_SIZE)];
        let mut filled = 0;
        let mut source_done = false;
        while filled < first.len() {
            let n = source.read(&mut first[filled..])?;
            if n == 0 {
                source_done = true;
                break;
            }
            filled += n;
        }
        first.truncate(filled);

        let (version, compressed, body_start) = match StreamHeader::detect(&first)? {
            Some(header) => (header.version, Some(header.compressed), HEADER_SIZE),
            None => {
                let version = match options.version {
                    Some(version) => version,
                    None => registry.primary().ok_or(CipherError::NoPrimary)?,
                };
                (version, None, 0)
            }
        };

        let mut session = registry.resolve(version)?;
        let carry = session.update(&first[body_start..])?;

        Ok(Self {
            source,
            session,
            version,
            compressed,
            chunk: vec![0u8; options.buffer_size],
            carry,
            carry_pos: 0,
            source_done,
            finalized: false,
        })
    }

    /// The cipher version this stream resolved at construction.
    ///
    /// Set once — from the header when present, otherwise from the
    /// caller's options or the registry's primary — and never
    /// recomputed.
    #[must_use]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The header's compressed flag, or `None` when the stream carried
    /// no header (unknown, not false).
    #[must_use]
    pub fn compressed(&self) -> Option<bool> {
        self.compressed
    }

    /// Give back the underlying source, abandoning any undelivered
    /// plaintext and the cipher session.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.source
    }
}

fn cipher_io(err: CipherError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

impl<S: Read> Read for DecryptStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            // Serve decrypted bytes we already hold.
            if self.carry_pos < self.carry.len() {
                let n = (self.carry.len() - self.carry_pos).min(buf.len());
                buf[..n].copy_from_slice(&self.carry[self.carry_pos..self.carry_pos + n]);
                self.carry_pos += n;
                if self.carry_pos == self.carry.len() {
                    self.carry.clear();
                    self.carry_pos = 0;
                }
                return Ok(n);
            }

            // Source exhausted: finalize exactly once, then it is truly
            // the end of the stream.
            if self.source_done {
                if self.finalized {
                    return Ok(0);
                }
                self.finalized = true;
                self.carry = self.session.finalize().map_err(cipher_io)?;
                self.carry_pos = 0;
                continue;
            }

            // Pull one chunk. An empty update result (block hold-back)
            // is not end of stream — keep pulling.
            let n = self.source.read(&mut self.chunk)?;
            if n == 0 {
                self.source_done = true;
            } else {
                self.carry = self.session.update(&self.chunk[..n]).map_err(cipher_io)?;
                self.carry_pos = 0;
            }
        }
    }
}
