/// Implementation of `sym cat`.
///
/// Decrypts the stream and emits it record by record through the
/// reader's lazy line iterator. Output is byte-identical to `decrypt`
/// (separators stay attached to their records); the point of the
/// command is the iteration — each record is materialised on its own,
/// so arbitrarily large streams flow through constant memory even when
/// downstream tools consume them line-wise.
use std::io::{self, Write as _};

use anyhow::{Context, Result};
use sym_reader::{Reader, ReaderOptions};

use crate::CatArgs;
use crate::cmd_inspect::peek_header;
use crate::keyfile;

/// Run the `sym cat` command.
///
/// # Errors
///
/// Returns an error if the keyfile is malformed, the cipher version
/// cannot be resolved, the stream is corrupt, or any I/O fails.
pub fn run(args: &CatArgs, verbose: bool) -> Result<()> {
    let registry = keyfile::load_registry(&args.keys)?;

    let compress = peek_header(&args.file)?.map(|h| h.compressed).unwrap_or(false);
    let options = ReaderOptions {
        version: args.version,
        compress,
        ..ReaderOptions::default()
    };

    let separator: Vec<u8> = args
        .separator
        .as_ref()
        .map_or_else(|| b"\n".to_vec(), |s| s.clone().into_bytes());

    let mut stdout = io::stdout().lock();
    let records = Reader::with(&args.file, &registry, options, |reader| {
        let mut records = 0u64;
        for line in reader.lines_with(separator) {
            stdout.write_all(&line?)?;
            records += 1;
        }
        Ok(records)
    })
    .with_context(|| format!("reading {}", args.file.display()))?;

    stdout.flush().context("flushing stdout")?;

    if verbose {
        eprintln!("{records} records");
    }

    Ok(())
}
