//! APOD metadata and media URL resolution.
//!
//! Images are cached from their HD URL. Videos are cached as their
//! thumbnail, derived from a YouTube embed URL or taken from the
//! provider's `thumbnail_url`. Both kinds leave this module as a single
//! resolved URL so the cache has one download path.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::FetchError;

static YOUTUBE_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?youtube\.com/embed/([A-Za-z0-9_-]+)(?:[?#/].*)?$")
        .expect("YouTube embed pattern is valid")
});

/// Kind of media published for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A still image
    Image,
    /// An embedded video
    Video,
    /// Anything else (interactive pages, etc.)
    #[serde(other)]
    Other,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
            MediaType::Other => write!(f, "other"),
        }
    }
}

/// The fields of an APOD API response the cache consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApodMetadata {
    /// Display title
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub explanation: String,
    /// Kind of media
    pub media_type: MediaType,
    /// Standard-resolution media URL (embed URL for videos)
    #[serde(default)]
    pub url: Option<String>,
    /// High-resolution image URL
    #[serde(default)]
    pub hdurl: Option<String>,
    /// Video thumbnail, present when requested with `thumbs=true`
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl ApodMetadata {
    /// Parse an APOD API JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] if required fields are missing.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(body)?)
    }

    /// The URL of the image to cache for this entry.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsupportedMedia`] when no image URL can be
    /// derived.
    pub fn resolve_media_url(&self) -> Result<String, FetchError> {
        let resolved = match self.media_type {
            MediaType::Image => self.hdurl.clone().or_else(|| self.url.clone()),
            MediaType::Video | MediaType::Other => self
                .url
                .as_deref()
                .and_then(youtube_thumbnail_url)
                .or_else(|| self.thumbnail_url.clone()),
        };

        resolved.ok_or_else(|| FetchError::UnsupportedMedia {
            media_type: self.media_type.to_string(),
        })
    }
}

/// Thumbnail URL for a YouTube embed URL.
///
/// ```
/// use apod_desktop::provider::youtube_thumbnail_url;
///
/// assert_eq!(
///     youtube_thumbnail_url("https://www.youtube.com/embed/abc123?x=1").as_deref(),
///     Some("https://img.youtube.com/vi/abc123/0.jpg")
/// );
/// assert_eq!(youtube_thumbnail_url("https://vimeo.com/video/1"), None);
/// ```
#[must_use]
pub fn youtube_thumbnail_url(embed_url: &str) -> Option<String> {
    YOUTUBE_EMBED
        .captures(embed_url)
        .and_then(|caps| caps.get(1))
        .map(|id| format!("https://img.youtube.com/vi/{}/0.jpg", id.as_str()))
}
