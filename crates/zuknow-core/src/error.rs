//! Repository and validation errors

use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// A malformed input record
///
/// `position` is the 1-based record (JSON) or row (CSV) number when the
/// error comes from a bulk import, and `None` for single-record input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub position: Option<usize>,
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            position: None,
            reason: reason.into(),
        }
    }

    pub fn at(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position: Some(position),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "record {}: {}", position, self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors returned by [`crate::QuestionRepository`]
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Reading the persisted collection failed; the in-memory view is unchanged
    #[error("Failed to load questions: {0}")]
    Load(#[source] StorageError),

    /// Writing through to storage failed; the in-memory view is unchanged
    #[error("Failed to save questions: {0}")]
    Persist(#[source] StorageError),

    /// No question with this id exists
    #[error("Question not found: {id}")]
    NotFound { id: String },

    /// The input record is malformed
    #[error("Invalid question: {0}")]
    Validation(#[from] ValidationError),
}

impl RepositoryError {
    /// The underlying storage error, if any
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            RepositoryError::Load(e) | RepositoryError::Persist(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::at(1, "answer is missing").to_string(),
            "record 1: answer is missing"
        );
        assert_eq!(
            ValidationError::new("question must not be empty").to_string(),
            "question must not be empty"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = RepositoryError::NotFound {
            id: "q_123".to_string(),
        };
        assert!(err.to_string().contains("q_123"));
        assert!(err.storage_error().is_none());
    }

    #[test]
    fn test_load_wraps_storage_error() {
        let err = RepositoryError::Load(StorageError::CorruptData {
            location: "slot".to_string(),
            details: "expected value".to_string(),
        });
        assert!(err.to_string().contains("Failed to load"));
        assert!(err.storage_error().is_some_and(|e| e.is_read()));
    }
}
