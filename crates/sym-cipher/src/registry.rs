use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use sym_wire::MAX_VERSION;

use crate::cbc::CbcDecryptor;
use crate::decryptor::Decryptor;
use crate::error::CipherError;

/// Cipher algorithms the registry can hand out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Aes128Cbc,
    Aes256Cbc,
}

impl Algorithm {
    /// Required key length in bytes.
    #[must_use]
    pub fn key_len(self) -> usize {
        match self {
            Algorithm::Aes128Cbc => 16,
            Algorithm::Aes256Cbc => 32,
        }
    }

    /// Required IV length in bytes.
    #[must_use]
    pub fn iv_len(self) -> usize {
        16
    }

    /// Canonical lowercase name, as used in keyfiles and error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Aes128Cbc => "aes-128-cbc",
            Algorithm::Aes256Cbc => "aes-256-cbc",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aes-128-cbc" => Ok(Algorithm::Aes128Cbc),
            "aes-256-cbc" => Ok(Algorithm::Aes256Cbc),
            other => Err(format!("unknown cipher algorithm: {other}")),
        }
    }
}

/// A cipher configuration: algorithm plus validated key material.
///
/// A `CipherSpec` is the registry's stored value — inert data, not a
/// session. Every resolution mints a fresh [`Decryptor`] from it, so two
/// readers resolving the same version never share block-boundary state.
pub struct CipherSpec {
    algorithm: Algorithm,
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl CipherSpec {
    /// Create a spec, validating key and IV lengths for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] or
    /// [`CipherError::InvalidIvLength`] on material of the wrong size —
    /// caught here, at configuration time, rather than at first read.
    pub fn new(
        algorithm: Algorithm,
        key: impl Into<Vec<u8>>,
        iv: impl Into<Vec<u8>>,
    ) -> Result<Self, CipherError> {
        let key = key.into();
        let iv = iv.into();
        if key.len() != algorithm.key_len() {
            return Err(CipherError::InvalidKeyLength {
                algorithm,
                have: key.len(),
                need: algorithm.key_len(),
            });
        }
        if iv.len() != algorithm.iv_len() {
            return Err(CipherError::InvalidIvLength {
                algorithm,
                have: iv.len(),
                need: algorithm.iv_len(),
            });
        }
        Ok(Self { algorithm, key, iv })
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Mint a fresh decryption session from this configuration.
    fn session(&self) -> Result<Box<dyn Decryptor>, CipherError> {
        let session = match self.algorithm {
            Algorithm::Aes128Cbc => CbcDecryptor::aes128(&self.key, &self.iv)?,
            Algorithm::Aes256Cbc => CbcDecryptor::aes256(&self.key, &self.iv)?,
        };
        Ok(Box::new(session))
    }
}

/// Version-to-cipher registry.
///
/// Maps the version number carried in a stream header (or supplied by
/// the caller) to a [`CipherSpec`]. One version may be marked *primary*;
/// it is the fallback when a stream has no header and the caller
/// configured no version.
///
/// ```text
///   resolve(version)   → fresh session, or NotFound { version }
///   resolve_primary()  → (version, fresh session), or NoPrimary
/// ```
///
/// Lookup failures are fatal at reader construction — they are never
/// retried and never deferred to a read call.
#[derive(Default)]
pub struct CipherRegistry {
    entries: BTreeMap<u16, CipherSpec>,
    primary: Option<u16>,
}

impl CipherRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cipher configuration under a version number.
    ///
    /// Re-registering a version replaces the previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::VersionOutOfRange`] for versions a stream
    /// header could never encode.
    pub fn register(&mut self, version: u16, spec: CipherSpec) -> Result<(), CipherError> {
        if version > MAX_VERSION {
            return Err(CipherError::VersionOutOfRange { version });
        }
        self.entries.insert(version, spec);
        Ok(())
    }

    /// Mark an already-registered version as the primary fallback.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::NotFound`] if the version has no entry.
    pub fn set_primary(&mut self, version: u16) -> Result<(), CipherError> {
        if !self.entries.contains_key(&version) {
            return Err(CipherError::NotFound { version });
        }
        self.primary = Some(version);
        Ok(())
    }

    /// The primary version, if one was marked.
    #[must_use]
    pub fn primary(&self) -> Option<u16> {
        self.primary
    }

    #[must_use]
    pub fn contains(&self, version: u16) -> bool {
        self.entries.contains_key(&version)
    }

    /// Registered versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }

    /// Resolve a version to a fresh decryption session.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::NotFound`] if the version has no entry.
    pub fn resolve(&self, version: u16) -> Result<Box<dyn Decryptor>, CipherError> {
        let spec = self
            .entries
            .get(&version)
            .ok_or(CipherError::NotFound { version })?;
        spec.session()
    }

    /// Resolve the primary version to a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::NoPrimary`] if no primary was marked.
    pub fn resolve_primary(&self) -> Result<(u16, Box<dyn Decryptor>), CipherError> {
        let version = self.primary.ok_or(CipherError::NoPrimary)?;
        Ok((version, self.resolve(version)?))
    }
}
