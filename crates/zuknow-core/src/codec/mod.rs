//! Import/export codec
//!
//! Converts the collection to and from files:
//!
//! - JSON export: an envelope with `metadata` and `questions`
//! - JSON import: the envelope or a bare array, validated record by record
//! - CSV import: a header row plus one question per line
//!
//! Imports only build questions. Whether they are appended to or replace
//! the collection is up to the caller (see [`crate::ImportMode`]).

pub mod csv;
pub mod json;

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::error::ValidationError;
use crate::models::Question;

pub use self::csv::import_csv;
pub use self::json::{export_json, export_json_at, import_json, ExportMetadata, EXPORT_VERSION};

/// Errors from reading or decoding an import
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Question data is not an array")]
    NotAnArray,

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported file type '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

impl CodecError {
    /// The validation failure, if that is what this is
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            CodecError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// File formats accepted for import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> CodecResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(ImportFormat::Json),
            Some("csv") => Ok(ImportFormat::Csv),
            _ => Err(CodecError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Decode file content in this format
    pub fn decode(&self, content: &str) -> CodecResult<Vec<Question>> {
        match self {
            ImportFormat::Json => import_json(content),
            ImportFormat::Csv => import_csv(content),
        }
    }
}

/// Read and decode an import file, choosing the format by extension
pub fn read_import_file(path: &Path) -> CodecResult<Vec<Question>> {
    let format = ImportFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let questions = format.decode(&content)?;
    info!(
        "Decoded {} question(s) from {:?} ({:?})",
        questions.len(),
        path,
        format
    );
    Ok(questions)
}

/// Default file name for an export made on `date`
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("zuknow_questions_{}.json", date.format("%Y-%m-%d"))
}
