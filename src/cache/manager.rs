//! Cache orchestration.
//!
//! [`CacheManager::add_to_cache`] ties the provider, the cache directory, the
//! hasher and the metadata store together:
//!
//! 1. Fetch the metadata for a date and resolve the media URL.
//! 2. Derive the file name from the title and the URL extension.
//! 3. Fingerprint the existing file, or download the media and fingerprint
//!    the bytes.
//! 4. Return the record that already owns the fingerprint, or write the file
//!    atomically, verify it from disk and insert a new record.
//!
//! A record is never inserted before its file is verified, and a record
//! returned for known content always has its file on disk.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use super::database::MetadataStore;
use super::directory::{derive_file_name, disambiguated_file_name, ensure_root_exists, CacheDirectory};
use super::entry::{CacheRecord, RecordId};
use super::hasher::ContentHasher;
use super::{CacheError, CacheResult, CacheSettings};
use crate::error::ApodError;
use crate::provider::{ApodMetadata, ApodProvider};

/// Owns the cache root, the metadata store and the provider used to fill them.
pub struct CacheManager<P> {
    directory: CacheDirectory,
    store: MetadataStore,
    db_path: PathBuf,
    hasher: ContentHasher,
    provider: P,
}

impl<P: ApodProvider> CacheManager<P> {
    /// Initialize the cache described by `settings`.
    ///
    /// Creates the cache root and the database if they do not exist. Opening
    /// an existing cache is a no-op that preserves its contents.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] if the directory or database cannot be
    /// created or opened.
    pub fn open(settings: &CacheSettings, provider: P) -> CacheResult<Self> {
        let directory = CacheDirectory::open(&settings.root)?;
        if let Some(parent) = settings.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_root_exists(parent)?;
            }
        }
        let store = MetadataStore::open(&settings.db_path)?;
        let db_path = std::path::absolute(&settings.db_path)
            .map_err(|e| CacheError::io(&settings.db_path, e))?;

        log::info!("Image cache directory: {}", directory.root().display());
        log::info!("Image cache database: {}", settings.db_path.display());

        Ok(Self {
            directory,
            store,
            db_path,
            hasher: ContentHasher::new(),
            provider,
        })
    }

    /// Add the APOD published on `date` to the cache.
    ///
    /// Returns the id of the record holding the media, whether it was
    /// inserted now or already present.
    ///
    /// # Errors
    ///
    /// * [`ApodError::Fetch`] if the provider fails or the media has no
    ///   cacheable image
    /// * [`ApodError::Storage`] if writing the file or the record fails
    pub fn add_to_cache(&mut self, date: NaiveDate) -> Result<RecordId, ApodError> {
        log::info!("APOD date: {}", date);

        let metadata = self.provider.fetch_metadata(date)?;
        let media_url = metadata.resolve_media_url()?;
        log::info!("APOD URL: {}", media_url);

        let file_name = self.media_file_name(&metadata.title, &media_url);
        let id = self.store_media(&metadata, &media_url, &file_name)?;

        self.store.record_date(date, id)?;
        Ok(id)
    }

    fn store_media(
        &mut self,
        metadata: &ApodMetadata,
        media_url: &str,
        file_name: &str,
    ) -> Result<RecordId, ApodError> {
        let path = self.directory.path_for(file_name);

        if !path.is_file() {
            let bytes = self.provider.download(media_url)?;
            let hash = self.hasher.fingerprint(&bytes);
            log::info!("APOD SHA-256: {}", hash);

            if let Some(id) = self.store.find_by_hash(&hash)? {
                log::info!("Identical image already cached as record {}", id);
                return self.reuse(id, &bytes, &hash);
            }
            return self.commit(metadata, file_name, &bytes, &hash);
        }

        let hash = self.hasher.fingerprint_file(&path)?;
        log::info!("APOD SHA-256: {}", hash);

        let Some(id) = self.store.find_by_hash(&hash)? else {
            // Written by a run that stopped before inserting its record
            log::info!("Adopting unrecorded file {}", path.display());
            return self.insert(metadata, &path, &hash);
        };

        let same_apod = self
            .store
            .get_by_id(id)?
            .is_none_or(|owner| owner.title == metadata.title);
        if same_apod {
            log::info!("APOD image is already in cache");
            return Ok(id);
        }

        // Another title sanitized to the same file name. Keep its file and
        // store ours next to it if the content differs.
        log::warn!(
            "{} already holds a different APOD, checking content",
            path.display()
        );
        let bytes = self.provider.download(media_url)?;
        let new_hash = self.hasher.fingerprint(&bytes);
        if let Some(existing) = self.store.find_by_hash(&new_hash)? {
            return self.reuse(existing, &bytes, &new_hash);
        }
        let alternate = disambiguated_file_name(file_name, &new_hash);
        self.commit(metadata, &alternate, &bytes, &new_hash)
    }

    /// File name for new media, never one of the metadata database's files.
    fn media_file_name(&self, title: &str, media_url: &str) -> String {
        let file_name = derive_file_name(title, media_url);
        if self.is_reserved(&self.directory.path_for(&file_name)) {
            let name = Path::new(&file_name);
            let stem = name
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let ext = name
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let alternate = format!("{}_image{}", stem, ext);
            log::warn!(
                "{} is reserved for the metadata database, using {}",
                file_name,
                alternate
            );
            return alternate;
        }
        file_name
    }

    fn is_reserved(&self, path: &Path) -> bool {
        let db = self.db_path.as_os_str();
        ["", "-journal", "-wal", "-shm"].iter().any(|suffix| {
            let mut reserved = db.to_os_string();
            reserved.push(suffix);
            path.as_os_str() == reserved
        })
    }

    /// Return a known record, rewriting its file if it went missing.
    fn reuse(&self, id: RecordId, bytes: &[u8], hash: &str) -> Result<RecordId, ApodError> {
        if let Some(record) = self.store.get_by_id(id)? {
            if !record.file_path.is_file() {
                log::warn!(
                    "Cached file {} is missing, restoring it",
                    record.file_path.display()
                );
                self.write_verified(&record.file_path, bytes, hash)?;
            }
        }
        Ok(id)
    }

    fn commit(
        &mut self,
        metadata: &ApodMetadata,
        file_name: &str,
        bytes: &[u8],
        hash: &str,
    ) -> Result<RecordId, ApodError> {
        let path = self.directory.path_for(file_name);
        self.write_verified(&path, bytes, hash)?;

        log::info!("Saved image file as {}", path.display());
        self.insert(metadata, &path, hash)
    }

    /// Write `bytes` atomically to `path` and check the fingerprint on disk.
    fn write_verified(&self, path: &Path, bytes: &[u8], hash: &str) -> CacheResult<()> {
        self.directory.write_atomic_at(path, bytes)?;

        let actual = self.hasher.fingerprint_file(path)?;
        if actual != hash {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Failed to remove unverified file {}: {}", path.display(), e);
            }
            return Err(CacheError::HashMismatch {
                path: path.to_path_buf(),
                expected: hash.to_string(),
                actual,
            });
        }
        Ok(())
    }

    fn insert(
        &mut self,
        metadata: &ApodMetadata,
        path: &Path,
        hash: &str,
    ) -> Result<RecordId, ApodError> {
        let (id, inserted) = self.store.insert_unless_present(
            &metadata.title,
            &metadata.explanation,
            path,
            hash,
        )?;
        if inserted {
            log::info!("Added APOD to image cache DB as record {}", id);
        }
        Ok(id)
    }
}

impl<P> CacheManager<P> {
    /// Read a cached record.
    ///
    /// A `None` or unknown id yields [`CacheRecord::unavailable`].
    pub fn get_info(&self, id: Option<RecordId>) -> CacheResult<CacheRecord> {
        let Some(id) = id else {
            return Ok(CacheRecord::unavailable());
        };
        Ok(self
            .store
            .get_by_id(id)?
            .unwrap_or_else(CacheRecord::unavailable))
    }

    /// Record previously cached for `date`, without contacting the provider.
    pub fn lookup_date(&self, date: NaiveDate) -> CacheResult<Option<RecordId>> {
        self.store.find_by_date(date)
    }

    /// Record owning a content fingerprint.
    pub fn find_by_hash(&self, hash: &str) -> CacheResult<Option<RecordId>> {
        self.store.find_by_hash(hash)
    }

    /// Titles of every cached APOD in storage order.
    pub fn list_titles(&self) -> CacheResult<Vec<String>> {
        self.store.list_titles()
    }

    /// The cache root.
    #[must_use]
    pub fn directory(&self) -> &CacheDirectory {
        &self.directory
    }

    /// The metadata store.
    #[must_use]
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// The provider used to fill the cache.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Flush and close the metadata store.
    pub fn close(self) -> CacheResult<()> {
        self.store.close()
    }
}
