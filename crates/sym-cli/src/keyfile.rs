/// JSON keyfile loading.
///
/// The keyfile maps cipher versions to key material, and optionally
/// marks one version as primary (the fallback for headerless streams
/// when no `--version` is given):
///
/// ```json
/// {
///   "primary": 1,
///   "ciphers": [
///     { "version": 1, "algorithm": "aes-256-cbc",
///       "key": "<64 hex chars>", "iv": "<32 hex chars>" },
///     { "version": 2, "algorithm": "aes-128-cbc",
///       "key": "<32 hex chars>", "iv": "<32 hex chars>" }
///   ]
/// }
/// ```
///
/// Key and IV lengths are validated when the registry entry is built,
/// so a malformed keyfile fails here — before any ciphertext is read.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use sym_cipher::{Algorithm, CipherRegistry, CipherSpec};

#[derive(Deserialize)]
struct Keyfile {
    primary: Option<u16>,
    ciphers: Vec<KeyfileEntry>,
}

#[derive(Deserialize)]
struct KeyfileEntry {
    version: u16,
    algorithm: String,
    key: String,
    iv: String,
}

/// Load a keyfile and build the cipher registry from it.
///
/// # Errors
///
/// Returns an error when the file cannot be read, the JSON does not
/// match the schema, an algorithm name is unknown, key/IV hex is
/// malformed or of the wrong length, or the primary version has no
/// entry.
pub fn load_registry(path: &Path) -> Result<CipherRegistry> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading keyfile {}", path.display()))?;
    let keyfile: Keyfile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing keyfile {}", path.display()))?;

    let mut registry = CipherRegistry::new();
    for entry in &keyfile.ciphers {
        let algorithm: Algorithm = entry
            .algorithm
            .parse()
            .map_err(|e: String| anyhow!(e))
            .with_context(|| format!("keyfile entry for version {}", entry.version))?;
        let key = hex::decode(&entry.key)
            .with_context(|| format!("key for version {} is not valid hex", entry.version))?;
        let iv = hex::decode(&entry.iv)
            .with_context(|| format!("iv for version {} is not valid hex", entry.version))?;

        let spec = CipherSpec::new(algorithm, key, iv)
            .with_context(|| format!("keyfile entry for version {}", entry.version))?;
        registry
            .register(entry.version, spec)
            .with_context(|| format!("registering version {}", entry.version))?;
    }

    if let Some(primary) = keyfile.primary {
        registry
            .set_primary(primary)
            .context("keyfile primary version has no cipher entry")?;
    }

    Ok(registry)
}
