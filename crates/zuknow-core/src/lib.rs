//! zuknow Core Library
//!
//! This crate provides the core functionality for zuknow, a personal
//! question bank for self-quizzing: questions with answers and
//! explanations, organized by category, tag and difficulty.
//!
//! # Architecture
//!
//! - **Repository**: the in-memory collection is the source of truth for
//!   the process, written through to storage on every mutation
//! - **Storage**: the whole collection is persisted as one serialized blob
//!   (a JSON file by default, or a SQLite slot)
//!
//! Queries and statistics are pure functions over a snapshot of the
//! collection.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut repo = QuestionRepository::open(&config)?;
//!
//! // Add a question
//! let q = repo.create(QuestionInput::new("2+2?", "4", "Basic arithmetic"))?;
//!
//! // Query
//! let science = query::by_category(repo.questions(), "science");
//! let stats = query::statistics(repo.questions());
//! ```
//!
//! # Modules
//!
//! - `repository`: CRUD with write-through persistence (main entry point)
//! - `models`: the question record and its input/patch types
//! - `query`: filters, search, sorting and statistics
//! - `codec`: JSON export/import and CSV import
//! - `quiz`: answer checking and the current-question selection
//! - `storage`: persistence backends
//! - `config`: application configuration

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod quiz;
pub mod repository;
pub mod storage;

pub use codec::{CodecError, CodecResult, ImportFormat};
pub use config::{Config, StorageBackend};
pub use error::{RepositoryError, RepositoryResult, ValidationError};
pub use models::{Difficulty, FieldUpdate, Question, QuestionInput, QuestionPatch};
pub use query::{QuestionFilter, SortField, SortOrder, Statistics};
pub use quiz::{check_answer, QuizOutcome, Selection};
pub use repository::{ImportMode, ImportSummary, QuestionRepository};
pub use storage::{QuestionStorage, StorageError, StorageStats};
