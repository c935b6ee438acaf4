//! Storage layer
//!
//! Persists the whole question collection as a single serialized blob
//! under one named slot. Three backends implement [`QuestionStorage`]:
//!
//! - [`JsonFileStorage`]: a JSON file written atomically (default)
//! - [`SqliteStorage`]: one row of a key/value table in SQLite
//! - [`MemoryStorage`]: an in-process blob, for tests and embedding
//!
//! All backends share the same serialized form: a JSON array of questions
//! with RFC 3339 timestamps and absent optional fields omitted.

pub mod error;
pub mod file;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use error::{StorageError, StorageOp, StorageResult};
pub use file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteStorage;

use crate::models::Question;

/// Name of the slot holding the serialized collection
pub const STORAGE_SLOT: &str = "zuknow_questions";

/// Durable storage for the question collection
///
/// Implementations never merge: `save_all` replaces whatever was stored.
pub trait QuestionStorage {
    /// Read the stored collection. An empty or never-written store loads as
    /// an empty collection; unreadable or undecodable data is an error.
    fn load(&self) -> StorageResult<Vec<Question>>;

    /// Replace the stored collection
    fn save_all(&mut self, questions: &[Question]) -> StorageResult<()>;

    /// Remove the stored collection
    fn clear(&mut self) -> StorageResult<()>;

    /// Human-readable location of the store (path, or a description)
    fn location(&self) -> String;

    /// Size and existence information for status output
    fn stats(&self) -> StorageStats {
        StorageStats {
            location: self.location(),
            exists: false,
            size: 0,
        }
    }
}

impl<S: QuestionStorage + ?Sized> QuestionStorage for Box<S> {
    fn load(&self) -> StorageResult<Vec<Question>> {
        (**self).load()
    }

    fn save_all(&mut self, questions: &[Question]) -> StorageResult<()> {
        (**self).save_all(questions)
    }

    fn clear(&mut self) -> StorageResult<()> {
        (**self).clear()
    }

    fn location(&self) -> String {
        (**self).location()
    }

    fn stats(&self) -> StorageStats {
        (**self).stats()
    }
}

/// Storage statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    pub location: String,
    pub exists: bool,
    /// Size in bytes of the stored data
    pub size: u64,
}

impl StorageStats {
    /// Size formatted for humans (e.g. "1.5 KB")
    pub fn size_human(&self) -> String {
        format_file_size(self.size)
    }
}

/// Serialize a collection into the stored form
pub fn encode_collection(questions: &[Question]) -> StorageResult<String> {
    serde_json::to_string(questions).map_err(StorageError::Serialize)
}

/// Deserialize a collection from the stored form
///
/// Blank content counts as an empty collection.
pub fn decode_collection(content: &str, location: &str) -> StorageResult<Vec<Question>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content).map_err(|e| StorageError::CorruptData {
        location: location.to_string(),
        details: e.to_string(),
    })
}

/// Format a byte count as Bytes/KB/MB/GB with at most two decimals
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", formatted, UNITS[unit])
}
