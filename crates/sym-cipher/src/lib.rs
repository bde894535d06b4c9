#![warn(clippy::pedantic)]

pub mod cbc;
pub mod decryptor;
pub mod error;
pub mod registry;

pub use cbc::CbcDecryptor;
pub use decryptor::Decryptor;
pub use error::CipherError;
pub use registry::{Algorithm, CipherRegistry, CipherSpec};
