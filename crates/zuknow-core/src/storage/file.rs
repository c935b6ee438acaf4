//! JSON file persistence
//!
//! Saves the collection to a single JSON file in the data directory.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/zuknow/questions.json` (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StorageError, StorageOp, StorageResult};
use super::{decode_collection, encode_collection, QuestionStorage, StorageStats};
use crate::models::Question;

/// File name of the collection inside the data directory
pub const QUESTIONS_FILE: &str = "questions.json";

/// Question storage backed by one JSON file
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a storage handler for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a storage handler for `questions.json` inside a data directory
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(QUESTIONS_FILE))
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl QuestionStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<Vec<Question>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No question file at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::from_io(e, self.location(), StorageOp::Read)),
        };
        let questions = decode_collection(&content, &self.location())?;

        debug!("Loaded {} question(s) from {:?}", questions.len(), self.path);
        Ok(questions)
    }

    fn save_all(&mut self, questions: &[Question]) -> StorageResult<()> {
        let content = encode_collection(questions)?;
        atomic_write(&self.path, content.as_bytes())?;

        debug!("Saved {} question(s) to {:?}", questions.len(), self.path);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, self.location(), StorageOp::Write)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn stats(&self) -> StorageStats {
        let size = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        StorageStats {
            location: self.location(),
            exists: self.exists(),
            size,
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");
    let temp_location = temp_path.display().to_string();

    let mut file = File::create(&temp_path)
        .map_err(|e| StorageError::from_io(e, temp_location.clone(), StorageOp::Write))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_location.clone(), StorageOp::Write))?;

    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_location, StorageOp::Write))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionInput};
    use tempfile::TempDir;

    fn sample(text: &str) -> Question {
        Question::new(
            QuestionInput::new(text, "answer", "explanation")
                .with_category("science")
                .with_difficulty(Difficulty::Medium),
        )
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::in_dir(temp_dir.path());

        // Initially no file, loads empty
        assert!(!storage.exists());
        assert!(storage.load().unwrap().is_empty());

        let questions = vec![sample("first"), sample("second")];
        storage.save_all(&questions).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded, questions);
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::in_dir(temp_dir.path());

        storage.save_all(&[sample("a"), sample("b")]).unwrap();
        storage.save_all(&[sample("c")]).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].question, "c");
    }

    #[test]
    fn test_load_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::in_dir(temp_dir.path());
        fs::write(storage.path(), "this is not json").unwrap();

        let err = storage.load().unwrap_err();
        assert!(matches!(err, StorageError::CorruptData { .. }));
        assert!(err.is_read());
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::in_dir(temp_dir.path());

        storage.save_all(&[sample("a")]).unwrap();
        storage.clear().unwrap();
        assert!(!storage.exists());
        assert!(storage.load().unwrap().is_empty());

        // Clearing an already-empty store is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_stats() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::in_dir(temp_dir.path());

        let stats = storage.stats();
        assert!(!stats.exists);
        assert_eq!(stats.size, 0);

        storage.save_all(&[sample("a")]).unwrap();
        let stats = storage.stats();
        assert!(stats.exists);
        assert!(stats.size > 0);
        assert!(stats.location.ends_with(QUESTIONS_FILE));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "[]");
        assert!(!nested_path.with_extension("tmp").exists());
    }

    #[test]
    fn test_write_into_file_as_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        // Parent "directory" is a regular file
        let mut storage = JsonFileStorage::in_dir(&blocker);
        let err = storage.save_all(&[sample("a")]).unwrap_err();
        assert!(err.is_write());
    }

    #[test]
    fn test_load_under_file_as_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let storage = JsonFileStorage::in_dir(&blocker);
        let err = storage.load().unwrap_err();
        assert!(err.is_read());
    }
}
