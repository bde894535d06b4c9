/// SYM command-line tool — inspect and decrypt `.sym` encrypted streams.
///
/// # Command overview
///
/// ```text
/// sym <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print header information for a SYM stream (no keys needed)
///   decrypt    Decrypt a stream to stdout or a file
///   cat        Decrypt a stream line by line
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Print extra detail to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                  |
/// |------|------------------------------------------|
/// | 0    | Success                                  |
/// | 1    | Error (I/O failure, bad keyfile, etc.)   |
///
/// All diagnostics go to stderr so stdout can be piped cleanly —
/// `decrypt` writes raw plaintext bytes to stdout by default.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod cmd_cat;
mod cmd_decrypt;
mod cmd_inspect;
mod keyfile;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The SYM encrypted-stream command-line tool.
#[derive(Parser)]
#[command(name = "sym", version, about = "SYM encrypted stream CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print extra detail (resolved version, byte counts) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print header information for a SYM stream.
    Inspect(InspectArgs),
    /// Decrypt a stream to stdout or a file.
    Decrypt(DecryptArgs),
    /// Decrypt a stream and emit it line by line.
    Cat(CatArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `sym inspect`.
///
/// Reads only the first bytes of the file — no key material required —
/// and reports whether the stream is self-describing, which cipher
/// version it carries and whether the plaintext is compressed.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the `.sym` file to inspect.
    pub file: PathBuf,
}

/// Arguments for `sym decrypt`.
///
/// Resolves the cipher from the keyfile (see [`keyfile`]) and streams
/// the plaintext out without buffering the whole file. When the header's
/// compressed flag is set, the zstd decompression stage is applied
/// automatically; `--raw` disables that and emits the decrypted bytes
/// as-is.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────┐
/// │ Flag          │ Effect                                           │
/// ├───────────────┼──────────────────────────────────────────────────┤
/// │ --keys FILE   │ JSON keyfile with version → cipher entries       │
/// │ -o, --output  │ Write plaintext to a file instead of stdout      │
/// │ --version N   │ Cipher version for headerless streams            │
/// │ --buffer-size │ Bytes per underlying read (default 4096)         │
/// │ --raw         │ Skip decompression even if the header says so    │
/// └───────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecryptArgs {
    /// Path to the `.sym` file to decrypt.
    pub file: PathBuf,

    /// Path to the JSON keyfile.
    #[arg(long)]
    pub keys: PathBuf,

    /// Write plaintext to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Cipher version to use when the stream carries no header.
    #[arg(long)]
    pub version: Option<u16>,

    /// Size of each underlying read, in bytes.
    #[arg(long, default_value_t = sym_reader::DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Emit decrypted bytes without the decompression stage.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for `sym cat`.
///
/// Like `decrypt`, but iterates the plaintext line by line through the
/// reader's lazy line iterator. Mostly useful with `--separator` to
/// re-split record-oriented streams.
#[derive(clap::Args)]
pub struct CatArgs {
    /// Path to the `.sym` file to read.
    pub file: PathBuf,

    /// Path to the JSON keyfile.
    #[arg(long)]
    pub keys: PathBuf,

    /// Cipher version to use when the stream carries no header.
    #[arg(long)]
    pub version: Option<u16>,

    /// Record separator (defaults to a newline). Used byte-for-byte.
    #[arg(long)]
    pub separator: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Decrypt(args) => cmd_decrypt::run(&args, cli.verbose),
        Commands::Cat(args) => cmd_cat::run(&args, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
