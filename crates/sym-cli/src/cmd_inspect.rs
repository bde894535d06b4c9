/// Implementation of `sym inspect`.
///
/// Reads only the first [`HEADER_SIZE`] bytes of the file and reports
/// what the header says — no key material is needed, and no ciphertext
/// is decrypted. Useful for answering "which keyfile entry do I need?"
/// before attempting a decrypt.
///
/// ```text
/// $ sym inspect backup.sym
/// file:       backup.sym
/// size:       8437 bytes
/// header:     present
/// version:    5
/// compressed: no
/// ciphertext: 8432 bytes
/// ```
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sym_wire::{HEADER_SIZE, StreamHeader};

use crate::InspectArgs;

/// Read up to the header length from the start of a file and run header
/// detection on it.
///
/// # Errors
///
/// Returns an error when the file cannot be read, or when the magic is
/// present but the flags field is truncated.
pub fn peek_header(path: &Path) -> Result<Option<StreamHeader>> {
    let mut file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let mut prefix = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = file
            .read(&mut prefix[filled..])
            .with_context(|| format!("reading {}", path.display()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    StreamHeader::detect(&prefix[..filled])
        .with_context(|| format!("{} has a broken header", path.display()))
}

/// Run the `sym inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or carries a truncated
/// header.
pub fn run(args: &InspectArgs) -> Result<()> {
    let size = std::fs::metadata(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?
        .len();
    let header = peek_header(&args.file)?;

    println!("file:       {}", args.file.display());
    println!("size:       {size} bytes");
    match header {
        Some(header) => {
            println!("header:     present");
            println!("version:    {}", header.version);
            println!(
                "compressed: {}",
                if header.compressed { "yes" } else { "no" }
            );
            println!("ciphertext: {} bytes", size.saturating_sub(HEADER_SIZE as u64));
        }
        None => {
            println!("header:     absent (cipher version must be supplied out-of-band)");
            println!("ciphertext: {size} bytes");
        }
    }

    Ok(())
}
