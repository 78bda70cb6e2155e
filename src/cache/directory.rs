//! Cache root ownership and the file-naming policy.
//!
//! Media files live directly under the cache root and are named after the
//! APOD title, with the extension taken from the media URL:
//!
//! ```
//! use apod_desktop::cache::derive_file_name;
//!
//! let name = derive_file_name(
//!     " NGC #3521: Galaxy in a Bubble ",
//!     "https://apod.nasa.gov/apod/image/2205/NGC3521LRGBHaAPOD-20.jpg",
//! );
//! assert_eq!(name, "NGC_3521_Galaxy_in_a_Bubble.jpg");
//! ```

use reqwest::Url;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

use super::CacheError;

/// Base name used when a title contains no usable characters.
pub const UNTITLED: &str = "untitled";

/// Number of fingerprint characters appended to disambiguated file names.
const DISAMBIGUATION_LEN: usize = 12;

/// Create the cache root (and its parents) if it does not exist.
///
/// # Errors
///
/// * [`CacheError::NotADirectory`] if something other than a directory
///   already occupies `root`
/// * [`CacheError::Io`] if the directory cannot be created
pub fn ensure_root_exists(root: &Path) -> Result<(), CacheError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {
            log::debug!("Cache directory already exists: {}", root.display());
            Ok(())
        }
        Ok(_) => Err(CacheError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(root).map_err(|e| CacheError::io(root, e))?;
            log::info!("Created cache directory: {}", root.display());
            Ok(())
        }
        Err(e) => Err(CacheError::io(root, e)),
    }
}

/// Derive the cache file name for a title and its media URL.
///
/// The base name is the NFC-normalized title with surrounding whitespace
/// trimmed, inner whitespace runs replaced by a single `_`, and every
/// character that is not a letter, digit or `_` removed. The extension
/// (with its leading dot) comes from the path component of `source_url`.
#[must_use]
pub fn derive_file_name(title: &str, source_url: &str) -> String {
    let mut base = sanitize_title(title);
    if base.is_empty() {
        base = UNTITLED.to_string();
    }
    format!("{}{}", base, url_extension(source_url))
}

fn sanitize_title(title: &str) -> String {
    let normalized: String = title.nfc().collect();
    normalized
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Extension of the URL's path component, including the dot.
///
/// Query strings and fragments never contribute to the extension.
fn url_extension(source_url: &str) -> String {
    let path = match Url::parse(source_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => source_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    // Only the last segment counts; a trailing `/` leaves it empty
    let segment = path.rsplit('/').next().unwrap_or_default();
    Path::new(segment)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Insert a fingerprint prefix before the extension of `file_name`.
///
/// Used when a different APOD already owns the title-derived name.
#[must_use]
pub fn disambiguated_file_name(file_name: &str, hash: &str) -> String {
    let prefix: String = hash.chars().take(DISAMBIGUATION_LEN).collect();
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, prefix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, prefix),
    }
}

/// The on-disk cache root.
#[derive(Debug, Clone)]
pub struct CacheDirectory {
    root: PathBuf,
}

impl CacheDirectory {
    /// Open the cache root, creating it if needed.
    ///
    /// Relative roots are resolved against the current directory so that
    /// every stored `file_path` is absolute.
    ///
    /// # Errors
    ///
    /// See [`ensure_root_exists`].
    pub fn open(root: impl AsRef<Path>) -> Result<Self, CacheError> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| CacheError::io(root, e))?;
        ensure_root_exists(&root)?;
        Ok(Self { root })
    }

    /// The absolute cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a file inside the cache root.
    #[must_use]
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Write `bytes` to `file_name` without ever exposing a partial file.
    ///
    /// The content goes to a temporary file inside the root first, is
    /// synced, and is then renamed over the final path (full overwrite).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if any step fails. The temporary file is
    /// removed in that case.
    pub fn write_atomic(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        let path = self.path_for(file_name);
        self.write_atomic_at(&path, bytes)?;
        Ok(path)
    }

    /// Like [`write_atomic`](Self::write_atomic), for a full path.
    ///
    /// The temporary file is created next to `path` so the final rename
    /// never crosses file systems.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if any step fails.
    pub fn write_atomic_at(&self, path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => self.root.as_path(),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".apod-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| CacheError::io(dir, e))?;
        temp.write_all(bytes)
            .map_err(|e| CacheError::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| CacheError::io(temp.path(), e))?;
        temp.persist(path)
            .map_err(|e| CacheError::io(path, e.error))?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
