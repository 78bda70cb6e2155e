//! APOD provider boundary.
//!
//! The cache only talks to the provider through [`ApodProvider`], so the
//! HTTP client in [`nasa`] can be swapped for an in-memory provider in tests.
//!
//! # Architecture
//!
//! * [`media`]: metadata types and media URL resolution (image vs. video)
//! * [`nasa`]: blocking client for the NASA APOD API

pub mod media;
pub mod nasa;

use chrono::NaiveDate;

pub use media::{youtube_thumbnail_url, ApodMetadata, MediaType};
pub use nasa::{NasaClient, ProviderSettings};

/// Source of APOD metadata and media bytes.
pub trait ApodProvider {
    /// Fetch the metadata for one calendar date.
    fn fetch_metadata(&self, date: NaiveDate) -> Result<ApodMetadata, FetchError>;

    /// Download the raw bytes behind a media URL.
    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Errors that can occur while talking to the provider.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The HTTP request itself failed (connection, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL (without credentials)
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The metadata response was not the expected JSON document.
    #[error("Malformed APOD response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A configured or resolved URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The media kind has no image we can cache.
    #[error("Unsupported media type '{media_type}' with no usable thumbnail")]
    UnsupportedMedia {
        /// Media type as reported by the provider
        media_type: String,
    },
}
