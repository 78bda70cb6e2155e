//! Content-addressed APOD cache.
//!
//! This module stores each downloaded APOD image once, keyed by the SHA-256
//! fingerprint of its bytes, and keeps the metadata in a SQLite database next
//! to the files.
//!
//! # Architecture
//!
//! The cache is split into four components:
//!
//! * [`hasher`]: SHA-256 content fingerprints.
//! * [`directory`]: The cache root, file naming policy and atomic writes.
//! * [`database`]: SQLite persistence of records and date mappings.
//! * [`manager`]: Orchestration of fetch, write, fingerprint and dedup.
//!
//! # Consistency
//!
//! * At most one record exists per fingerprint.
//! * A record is inserted only after its file has been written and its
//!   fingerprint verified from disk.
//! * Records are never updated or deleted.

pub mod database;
pub mod directory;
pub mod entry;
pub mod hasher;
pub mod manager;

use std::path::{Path, PathBuf};

pub use database::MetadataStore;
pub use directory::{derive_file_name, disambiguated_file_name, ensure_root_exists, CacheDirectory};
pub use entry::{is_unavailable_path, CacheRecord, RecordId};
pub use hasher::{ContentHasher, FINGERPRINT_LEN};
pub use manager::CacheManager;

/// Default name of the metadata database inside the cache root.
pub const DEFAULT_DB_FILE: &str = "apod.db";

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by the storage layer.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// An I/O error occurred on a cache path.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cache root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The metadata database reported an error.
    #[error("Cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A path cannot be stored as text in the database.
    #[error("Path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    /// A written file did not read back with the expected fingerprint.
    #[error("Fingerprint mismatch for {path}: expected {expected}, found {actual}")]
    HashMismatch {
        /// File that was verified
        path: PathBuf,
        /// Fingerprint of the bytes that were written
        expected: String,
        /// Fingerprint read back from disk
        actual: String,
    },
}

impl CacheError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Locations of the cache on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Directory holding the media files
    pub root: PathBuf,
    /// SQLite database file
    pub db_path: PathBuf,
}

impl CacheSettings {
    /// Settings with the database at its default location inside `root`.
    #[must_use]
    pub fn in_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let db_path = root.join(DEFAULT_DB_FILE);
        Self { root, db_path }
    }
}
