//! SQLite persistence
//!
//! Stores the serialized collection as one row of the `slots` table,
//! keyed by [`STORAGE_SLOT`]. The database lives at
//! `~/.local/share/zuknow/zuknow.db` by default.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::error::{StorageError, StorageOp, StorageResult};
use super::schema::{init_schema, needs_init};
use super::{decode_collection, encode_collection, QuestionStorage, StorageStats, STORAGE_SLOT};
use crate::models::Question;

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "zuknow.db";

/// Question storage backed by a SQLite key/value table
pub struct SqliteStorage {
    conn: Connection,
    path: Option<PathBuf>,
    slot: String,
}

impl SqliteStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    StorageError::CreateDirectory {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StorageError::database(StorageOp::Read, e))?;
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Open `zuknow.db` inside a data directory
    pub fn in_dir(data_dir: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open(data_dir.as_ref().join(DATABASE_FILE))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::database(StorageOp::Read, e))?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        if needs_init(&conn) {
            init_schema(&conn).map_err(|e| StorageError::database(StorageOp::Write, e))?;
        }

        Ok(Self {
            conn,
            path,
            slot: STORAGE_SLOT.to_string(),
        })
    }

    /// Use a different slot key (several collections can share one database)
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    /// Get the slot key
    pub fn slot(&self) -> &str {
        &self.slot
    }

    fn read_slot(&self) -> StorageResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?",
                params![self.slot],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::database(StorageOp::Read, e))
    }
}

impl QuestionStorage for SqliteStorage {
    fn load(&self) -> StorageResult<Vec<Question>> {
        let Some(content) = self.read_slot()? else {
            debug!("Slot '{}' is empty, starting empty", self.slot);
            return Ok(Vec::new());
        };

        let questions = decode_collection(&content, &self.location())?;
        debug!("Loaded {} question(s) from slot '{}'", questions.len(), self.slot);
        Ok(questions)
    }

    fn save_all(&mut self, questions: &[Question]) -> StorageResult<()> {
        let content = encode_collection(questions)?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO slots (key, value, updated_at) VALUES (?, ?, ?)",
                params![self.slot, content, Utc::now().timestamp()],
            )
            .map_err(|e| StorageError::database(StorageOp::Write, e))?;

        debug!("Saved {} question(s) to slot '{}'", questions.len(), self.slot);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM slots WHERE key = ?", params![self.slot])
            .map_err(|e| StorageError::database(StorageOp::Write, e))?;
        Ok(())
    }

    fn location(&self) -> String {
        match &self.path {
            Some(path) => format!("{}#{}", path.display(), self.slot),
            None => format!(":memory:#{}", self.slot),
        }
    }

    fn stats(&self) -> StorageStats {
        let size = self
            .read_slot()
            .ok()
            .flatten()
            .map(|content| content.len() as u64);

        StorageStats {
            location: self.location(),
            exists: size.is_some(),
            size: size.unwrap_or(0),
        }
    }
}
