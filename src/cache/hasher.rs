//! SHA-256 content fingerprints.
//!
//! # Overview
//! The fingerprint is the sole dedup key of the cache, so it must come from a
//! cryptographic hash. Fingerprints are lowercase hex strings of
//! [`FINGERPRINT_LEN`] characters.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::CacheError;

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// Read buffer used when hashing files from disk.
const BUFFER_SIZE: usize = 64 * 1024;

/// Computes content fingerprints for in-memory blobs and files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint a byte blob.
    ///
    /// # Example
    ///
    /// ```
    /// use apod_desktop::cache::ContentHasher;
    ///
    /// let hash = ContentHasher::new().fingerprint(b"abc");
    /// assert_eq!(
    ///     hash,
    ///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    /// );
    /// ```
    #[must_use]
    pub fn fingerprint(&self, bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Fingerprint the contents of a file, streaming it in fixed-size chunks.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file cannot be opened or read.
    pub fn fingerprint_file(&self, path: &Path) -> Result<String, CacheError> {
        let file = File::open(path).map_err(|e| CacheError::io(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            let n = reader
                .read(&mut buffer)
                .map_err(|e| CacheError::io(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}
