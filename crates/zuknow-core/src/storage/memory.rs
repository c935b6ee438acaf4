//! In-process storage
//!
//! Keeps the serialized blob in memory. The collection still goes through
//! the same encode/decode path as the durable backends.

use super::error::StorageResult;
use super::{decode_collection, encode_collection, QuestionStorage, StorageStats};
use crate::models::Question;

/// Question storage that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    blob: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-serialized blob
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }

    /// The raw stored blob, if anything has been saved
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl QuestionStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Vec<Question>> {
        match &self.blob {
            Some(blob) => decode_collection(blob, "memory"),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&mut self, questions: &[Question]) -> StorageResult<()> {
        self.blob = Some(encode_collection(questions)?);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.blob = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn stats(&self) -> StorageStats {
        StorageStats {
            location: self.location(),
            exists: self.blob.is_some(),
            size: self.blob.as_ref().map_or(0, |b| b.len() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionInput;

    #[test]
    fn test_round_trip() {
        let mut storage = MemoryStorage::new();
        let questions = vec![Question::new(QuestionInput::new("q", "a", "e"))];

        storage.save_all(&questions).unwrap();
        assert!(storage.blob().is_some());
        assert_eq!(storage.load().unwrap(), questions);

        storage.clear().unwrap();
        assert!(storage.blob().is_none());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_blob() {
        let storage = MemoryStorage::with_blob("nope");
        assert!(storage.load().unwrap_err().is_read());
    }
}
