#![deny(unsafe_code)]

use std::io::ErrorKind;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::StandardsError;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Checksum of a table on disk. A table that does not exist is
/// [`StandardsError::MissingFile`].
pub fn sha256_file(path: &Path) -> Result<String, StandardsError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(sha256_hex(&bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StandardsError::MissingFile {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(StandardsError::io(path, e)),
    }
}
