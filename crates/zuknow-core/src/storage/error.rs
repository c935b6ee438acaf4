//! Storage error handling
//!
//! Provides typed errors for storage operations with descriptive messages
//! and recovery suggestions.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which direction a storage operation was going when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Read,
    Write,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageOp::Read => f.write_str("read"),
            StorageOp::Write => f.write_str("write"),
        }
    }
}

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing the store
    #[error("Permission denied: cannot {op} '{location}'. Check file permissions.")]
    PermissionDenied {
        location: String,
        op: StorageOp,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{location}'. Free up disk space and try again."
    )]
    DiskFull {
        location: String,
        #[source]
        source: io::Error,
    },

    /// Failed to read the store
    #[error("Failed to read '{location}': {source}")]
    ReadError {
        location: String,
        #[source]
        source: io::Error,
    },

    /// Failed to write the store
    #[error("Failed to write '{location}': {source}")]
    WriteError {
        location: String,
        #[source]
        source: io::Error,
    },

    /// Stored data exists but cannot be deserialized
    #[error("Stored questions in '{location}' are corrupted: {details}")]
    CorruptData { location: String, details: String },

    /// The collection could not be serialized
    #[error("Failed to serialize questions: {0}")]
    Serialize(#[source] serde_json::Error),

    /// SQLite database error
    #[error("Database {op} error: {source}")]
    Database {
        op: StorageOp,
        #[source]
        source: rusqlite::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Create an error from an I/O error with location context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, location: impl Into<String>, op: StorageOp) -> Self {
        let location = location.into();
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                location,
                op,
                source: error,
            },
            // StorageFull is not stable on every toolchain, so the message is checked too
            _ if op == StorageOp::Write && is_disk_full_error(&error) => StorageError::DiskFull {
                location,
                source: error,
            },
            _ => match op {
                StorageOp::Read => StorageError::ReadError {
                    location,
                    source: error,
                },
                StorageOp::Write => StorageError::WriteError {
                    location,
                    source: error,
                },
            },
        }
    }

    /// Create a database error for the given operation
    pub fn database(op: StorageOp, source: rusqlite::Error) -> Self {
        StorageError::Database { op, source }
    }

    /// The direction of the failed operation
    pub fn op(&self) -> StorageOp {
        match self {
            StorageError::ReadError { .. } | StorageError::CorruptData { .. } => StorageOp::Read,
            StorageError::PermissionDenied { op, .. } | StorageError::Database { op, .. } => *op,
            StorageError::CreateDirectory { .. }
            | StorageError::DiskFull { .. }
            | StorageError::WriteError { .. }
            | StorageError::Serialize(_)
            | StorageError::AtomicWriteFailed { .. } => StorageOp::Write,
        }
    }

    /// True if the store could not be read or its contents could not be decoded
    pub fn is_read(&self) -> bool {
        self.op() == StorageOp::Read
    }

    /// True if the store could not be written
    pub fn is_write(&self) -> bool {
        self.op() == StorageOp::Write
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StorageError::CorruptData { .. } => {
                Some("The stored file could not be parsed. Restore it from an export, or run `zuknow clear --yes` to start fresh.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, "/test/path", StorageOp::Read);

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.is_read());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_read_classification() {
        let io_err = io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        let err = StorageError::from_io(io_err, "/data/questions.json", StorageOp::Read);

        assert!(matches!(err, StorageError::ReadError { .. }));
        assert!(err.is_read());
        assert!(!err.is_write());
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, "/full/disk", StorageOp::Write);

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.is_write());
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::PermissionDenied {
            location: "/test/file".to_string(),
            op: StorageOp::Write,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let msg = err.to_string();
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("cannot write"));
        assert!(msg.contains("/test/file"));
    }

    #[test]
    fn test_corrupt_data_is_read_error() {
        let err = StorageError::CorruptData {
            location: "/data/questions.json".to_string(),
            details: "expected value at line 1 column 1".to_string(),
        };

        assert!(err.to_string().contains("corrupted"));
        assert!(err.is_read());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_database_error_keeps_op() {
        let err = StorageError::database(StorageOp::Write, rusqlite::Error::InvalidQuery);
        assert!(err.is_write());
        assert!(err.to_string().contains("write"));
    }
}
