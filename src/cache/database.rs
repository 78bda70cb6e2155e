//! SQLite-backed metadata store.
//!
//! Two tables live in the cache database:
//!
//! * `apod_images` - one row per distinct media fingerprint
//! * `apod_dates` - which record each successfully cached date resolved to
//!
//! Several dates may map to the same record when the provider served
//! byte-identical media for them.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};

use super::entry::{CacheRecord, RecordId};
use super::{CacheError, CacheResult};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS apod_images (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        explanation TEXT NOT NULL,
        file_path   TEXT NOT NULL,
        hash        TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS apod_dates (
        apod_date TEXT PRIMARY KEY,
        record_id INTEGER NOT NULL REFERENCES apod_images(id)
    );
";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistent store of cache records.
pub struct MetadataStore {
    conn: Connection,
}

impl MetadataStore {
    /// Opens or creates the store at the specified path.
    ///
    /// Creating the tables is idempotent, so reopening an existing database
    /// preserves its contents.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the file cannot be opened or is not
    /// a SQLite database.
    pub fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn)?;
        log::debug!("Opened metadata store at {}", path.display());
        Ok(store)
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> CacheResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> CacheResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Id of the record with exactly this fingerprint, if any.
    pub fn find_by_hash(&self, hash: &str) -> CacheResult<Option<RecordId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM apod_images WHERE hash = ?1",
                params![hash],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.and_then(RecordId::from_raw))
    }

    /// Append a new record and return its id.
    ///
    /// # Errors
    ///
    /// Fails with [`CacheError::Database`] if a record with the same hash
    /// already exists; existing rows are never modified.
    pub fn insert(
        &self,
        title: &str,
        explanation: &str,
        file_path: &Path,
        hash: &str,
    ) -> CacheResult<RecordId> {
        let path = path_to_text(file_path)?;
        self.conn.execute(
            "INSERT INTO apod_images (title, explanation, file_path, hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![title, explanation, path, hash],
        )?;
        Ok(RecordId(self.conn.last_insert_rowid()))
    }

    /// Look up `hash` and insert a new record only if it is absent.
    ///
    /// Both steps run inside one immediate transaction. Returns the id and
    /// whether a row was inserted.
    pub fn insert_unless_present(
        &mut self,
        title: &str,
        explanation: &str,
        file_path: &Path,
        hash: &str,
    ) -> CacheResult<(RecordId, bool)> {
        let path = path_to_text(file_path)?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = tx
            .query_row(
                "SELECT id FROM apod_images WHERE hash = ?1",
                params![hash],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        let result = match existing {
            Some(id) => (RecordId(id), false),
            None => {
                tx.execute(
                    "INSERT INTO apod_images (title, explanation, file_path, hash)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![title, explanation, path, hash],
                )?;
                (RecordId(tx.last_insert_rowid()), true)
            }
        };

        tx.commit()?;
        Ok(result)
    }

    /// Fetch a record by id.
    pub fn get_by_id(&self, id: RecordId) -> CacheResult<Option<CacheRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, title, explanation, file_path, hash
                 FROM apod_images WHERE id = ?1",
                params![id.get()],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// All titles in storage order.
    pub fn list_titles(&self) -> CacheResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title FROM apod_images ORDER BY id")?;
        let titles = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(titles)
    }

    /// Remember that `date` resolved to record `id`.
    pub fn record_date(&self, date: NaiveDate, id: RecordId) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO apod_dates (apod_date, record_id) VALUES (?1, ?2)",
            params![date.format(DATE_FORMAT).to_string(), id.get()],
        )?;
        Ok(())
    }

    /// Id of the record previously cached for `date`.
    pub fn find_by_date(&self, date: NaiveDate) -> CacheResult<Option<RecordId>> {
        let id = self
            .conn
            .query_row(
                "SELECT record_id FROM apod_dates WHERE apod_date = ?1",
                params![date.format(DATE_FORMAT).to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.and_then(RecordId::from_raw))
    }

    /// Number of records in the store.
    pub fn count(&self) -> CacheResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM apod_images", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }

    /// Flush and close the connection.
    pub fn close(self) -> CacheResult<()> {
        self.conn.close().map_err(|(_, e)| CacheError::Database(e))
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<CacheRecord> {
    Ok(CacheRecord {
        id: RecordId::from_raw(row.get(0)?),
        title: row.get(1)?,
        explanation: row.get(2)?,
        file_path: PathBuf::from(row.get::<_, String>(3)?),
        hash: row.get(4)?,
    })
}

fn path_to_text(path: &Path) -> CacheResult<&str> {
    path.to_str()
        .ok_or_else(|| CacheError::InvalidPath(path.to_path_buf()))
}
