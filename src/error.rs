//! Structured error handling and exit codes.

use serde::Serialize;

use crate::cache::CacheError;
use crate::date::DateError;
use crate::provider::FetchError;

/// Top-level error for one APOD run.
#[derive(thiserror::Error, Debug)]
pub enum ApodError {
    /// The requested date is unparsable or outside the APOD archive.
    #[error("Invalid APOD date specified: {0}")]
    InvalidDate(#[from] DateError),

    /// The provider could not supply a cacheable image.
    #[error("Failed to fetch APOD: {0}")]
    Fetch(#[from] FetchError),

    /// The cache directory, a media file or the database failed.
    #[error("Cache storage failure: {0}")]
    Storage(#[from] CacheError),
}

/// Exit codes for the apod-desktop application.
///
/// - 0: Success (APOD cached, background applied unless disabled)
/// - 1: General error (fetch or storage failure)
/// - 2: Invalid date argument
/// - 3: Nothing cached for the requested date (offline lookup miss)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the APOD is in the cache.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Invalid date: the date argument was rejected before touching the cache.
    InvalidDate = 2,
    /// Not cached: no record exists for the requested date.
    NotCached = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "AP000",
            Self::GeneralError => "AP001",
            Self::InvalidDate => "AP002",
            Self::NotCached => "AP003",
        }
    }

    /// Exit code matching an error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ApodError>() {
            Some(ApodError::InvalidDate(_)) => Self::InvalidDate,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "AP001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
