//! Cache record definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier of a row in the metadata store.
///
/// Ids are assigned by the store on insert and start at 1. The raw value 0
/// is the persisted "no record" sentinel and never becomes a `RecordId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub(crate) i64);

impl RecordId {
    /// Convert a raw id, mapping the sentinel (and anything below it) to `None`.
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// The raw database id.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cached APOD: metadata plus the location and fingerprint of its media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Store-assigned id, `None` only for [`CacheRecord::unavailable`]
    pub id: Option<RecordId>,
    /// Title as received from the provider
    pub title: String,
    /// Free-text description
    pub explanation: String,
    /// Absolute path of the cached media file
    pub file_path: PathBuf,
    /// SHA-256 fingerprint of the media file
    pub hash: String,
}

impl CacheRecord {
    /// Marker stored in `file_path` when no record is available.
    pub const UNAVAILABLE: &'static str = "<not available>";

    /// The record returned for a missing or absent id.
    ///
    /// Its `file_path` is [`CacheRecord::UNAVAILABLE`] rather than a dangling
    /// path, so consumers such as the background setter can skip it.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            id: None,
            title: String::new(),
            explanation: String::new(),
            file_path: PathBuf::from(Self::UNAVAILABLE),
            hash: String::new(),
        }
    }

    /// Whether this record points at a real cached file.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !is_unavailable_path(&self.file_path)
    }
}

/// Whether `path` is the [`CacheRecord::UNAVAILABLE`] marker.
#[must_use]
pub fn is_unavailable_path(path: &Path) -> bool {
    path == Path::new(CacheRecord::UNAVAILABLE)
}
