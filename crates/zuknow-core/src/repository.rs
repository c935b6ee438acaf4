//! Question repository
//!
//! The `QuestionRepository` owns the in-memory collection and the storage
//! backend it was loaded from. It is the source of truth for the process:
//!
//! - Materialized from storage when opened
//! - Every mutation writes the whole next collection through to storage
//!   first, and only swaps the in-memory view once the write succeeded
//!
//! ## Usage
//!
//! ```ignore
//! let config = Config::load()?;
//! let mut repo = QuestionRepository::open(&config)?;
//!
//! let q = repo.create(QuestionInput::new("2+2?", "4", "arithmetic"))?;
//! repo.update(&q.id, QuestionPatch::new().category("math"))?;
//! ```

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{RepositoryError, RepositoryResult, ValidationError};
use crate::models::{generate_id, Question, QuestionInput, QuestionPatch};
use crate::storage::{QuestionStorage, StorageError, StorageStats};

/// How imported records are combined with the existing collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Add to the collection; a record whose id already exists replaces it in place
    #[default]
    Append,
    /// Discard the current collection and keep only the imported records
    Replace,
}

/// What a bulk import changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records appended as new questions
    pub added: usize,
    /// Records that replaced a question with the same id
    pub replaced: usize,
    /// Collection size after the import
    pub total: usize,
}

/// CRUD over the question collection with write-through persistence
pub struct QuestionRepository {
    storage: Box<dyn QuestionStorage>,
    questions: Vec<Question>,
}

impl QuestionRepository {
    /// Open the repository over the configured storage backend
    pub fn open(config: &Config) -> RepositoryResult<Self> {
        let storage = config.open_storage().map_err(RepositoryError::Load)?;
        Self::from_boxed(storage)
    }

    /// Open the repository over a specific storage backend
    pub fn with_storage(storage: impl QuestionStorage + 'static) -> RepositoryResult<Self> {
        Self::from_boxed(Box::new(storage))
    }

    fn from_boxed(storage: Box<dyn QuestionStorage>) -> RepositoryResult<Self> {
        let mut repo = Self {
            storage,
            questions: Vec::new(),
        };
        repo.load_all()?;
        Ok(repo)
    }

    /// Re-read the collection from storage
    ///
    /// On failure the in-memory collection is left as it was.
    pub fn load_all(&mut self) -> RepositoryResult<&[Question]> {
        let questions = self.storage.load().map_err(|e| {
            warn!("Failed to load questions from {}: {}", self.storage.location(), e);
            RepositoryError::Load(e)
        })?;

        debug!("Repository holds {} question(s)", questions.len());
        self.questions = questions;
        Ok(&self.questions)
    }

    /// Create a question from input
    ///
    /// The new question gets a fresh id and `created_at == updated_at`.
    pub fn create(&mut self, mut input: QuestionInput) -> RepositoryResult<Question> {
        input.check_required()?;
        if input.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            input.category = None;
        }

        let mut question = Question::new(input);
        while self.contains(&question.id) {
            question.id = generate_id();
        }

        let mut next = self.questions.clone();
        next.push(question.clone());
        self.commit(next)?;

        debug!("Created question {}", question.id);
        Ok(question)
    }

    /// Merge a patch onto an existing question
    pub fn update(&mut self, id: &str, patch: QuestionPatch) -> RepositoryResult<Question> {
        let index = self.position(id).ok_or_else(|| RepositoryError::NotFound {
            id: id.to_string(),
        })?;

        let mut updated = self.questions[index].clone();
        updated.apply(patch)?;

        let mut next = self.questions.clone();
        next[index] = updated.clone();
        self.commit(next)?;

        debug!("Updated question {}", id);
        Ok(updated)
    }

    /// Delete a question
    ///
    /// Deleting an unknown id is a no-op. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> RepositoryResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("Delete of unknown question {} ignored", id);
            return Ok(false);
        };

        let mut next = self.questions.clone();
        next.remove(index);
        self.commit(next)?;

        debug!("Deleted question {}", id);
        Ok(true)
    }

    /// Look up a question by exact id
    pub fn get_by_id(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Remove every question from memory and storage
    pub fn clear_all(&mut self) -> RepositoryResult<()> {
        self.storage.clear().map_err(|e| self.persist_failed(e))?;
        let removed = self.questions.len();
        self.questions.clear();

        info!("Cleared {} question(s)", removed);
        Ok(())
    }

    /// Store a batch of already-built questions (the import path)
    ///
    /// Every record must have its required fields. Nothing is written if
    /// any record is rejected.
    pub fn import(
        &mut self,
        records: Vec<Question>,
        mode: ImportMode,
    ) -> RepositoryResult<ImportSummary> {
        for (i, record) in records.iter().enumerate() {
            record
                .check_required()
                .map_err(|e| ValidationError::at(i + 1, e.reason))?;
            if record.id.trim().is_empty() {
                return Err(ValidationError::at(i + 1, "id must not be empty").into());
            }
        }

        let mut next = match mode {
            ImportMode::Append => self.questions.clone(),
            ImportMode::Replace => Vec::with_capacity(records.len()),
        };

        let mut added = 0;
        let mut replaced = 0;
        for record in records {
            match next.iter().position(|q| q.id == record.id) {
                Some(index) => {
                    next[index] = record;
                    replaced += 1;
                }
                None => {
                    next.push(record);
                    added += 1;
                }
            }
        }

        self.commit(next)?;

        let summary = ImportSummary {
            added,
            replaced,
            total: self.questions.len(),
        };
        info!(
            "Imported {} new and {} replaced question(s) ({:?})",
            summary.added, summary.replaced, mode
        );
        Ok(summary)
    }

    /// Snapshot of the whole collection, in insertion order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Size and location of the backing store
    pub fn storage_stats(&self) -> StorageStats {
        self.storage.stats()
    }

    /// Human-readable location of the backing store
    pub fn location(&self) -> String {
        self.storage.location()
    }

    fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    /// Write `next` through to storage, then make it the in-memory view
    fn commit(&mut self, next: Vec<Question>) -> RepositoryResult<()> {
        self.storage
            .save_all(&next)
            .map_err(|e| self.persist_failed(e))?;
        self.questions = next;
        Ok(())
    }

    fn persist_failed(&self, e: StorageError) -> RepositoryError {
        warn!("Failed to write to {}: {}", self.storage.location(), e);
        RepositoryError::Persist(e)
    }
}
