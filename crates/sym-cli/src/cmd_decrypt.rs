/// Implementation of `sym decrypt`.
///
/// Builds the cipher registry from the keyfile, opens the stream through
/// the scoped reader (so the file is released on every exit path), and
/// copies plaintext to stdout or `-o <file>` without ever holding the
/// whole stream in memory.
///
/// Decompression is automatic: when the header's compressed flag is set
/// the zstd stage is layered in, unless `--raw` was given. Headerless
/// streams are never auto-decompressed — the flag is simply unknown.
use std::fs::File;
use std::io::{self, Write as _};

use anyhow::{Context, Result};
use sym_reader::{Reader, ReaderOptions};

use crate::DecryptArgs;
use crate::cmd_inspect::peek_header;
use crate::keyfile;

/// Run the `sym decrypt` command.
///
/// # Errors
///
/// Returns an error if the keyfile is malformed, the cipher version
/// cannot be resolved, the stream is corrupt, or any I/O fails.
pub fn run(args: &DecryptArgs, verbose: bool) -> Result<()> {
    let registry = keyfile::load_registry(&args.keys)?;

    let compress = if args.raw {
        false
    } else {
        peek_header(&args.file)?.map(|h| h.compressed).unwrap_or(false)
    };

    let options = ReaderOptions {
        version: args.version,
        compress,
        buffer_size: args.buffer_size,
    };

    let mut output: Box<dyn io::Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let (version, written) =
        Reader::with(&args.file, &registry, options, |reader| {
            let version = reader.version();
            let written = io::copy(reader, &mut output)?;
            Ok((version, written))
        })
        .with_context(|| format!("decrypting {}", args.file.display()))?;

    output.flush().context("flushing output")?;

    if verbose {
        eprintln!(
            "decrypted {written} bytes (cipher version {version}{})",
            if compress { ", decompressed" } else { "" }
        );
    }

    Ok(())
}
