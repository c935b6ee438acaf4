//! Data models for zuknow
//!
//! Defines the question record, its difficulty, and the input types used
//! to create and update questions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Minimum length (in characters, after trimming) of a question prompt entered through a form
pub const MIN_QUESTION_LEN: usize = 5;

/// Minimum length (in characters, after trimming) of an explanation entered through a form
pub const MIN_EXPLANATION_LEN: usize = 10;

/// How hard a question is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Severity rank used for sorting. Unspecified ranks after `Hard`.
    pub fn rank(difficulty: Option<Difficulty>) -> u8 {
        match difficulty {
            Some(Difficulty::Easy) => 1,
            Some(Difficulty::Medium) => 2,
            Some(Difficulty::Hard) => 3,
            None => 4,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of `easy`, `medium`, `hard`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDifficulty(pub String);

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown difficulty '{}' (expected easy, medium or hard)",
            self.0
        )
    }
}

impl std::error::Error for UnknownDifficulty {}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    /// Exact, case-sensitive match, the same rule the import formats apply
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(UnknownDifficulty(other.to_string())),
        }
    }
}

/// A flashcard-style question with its answer and explanation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier, never changes after creation
    pub id: String,
    /// The prompt
    pub question: String,
    /// The expected answer
    pub answer: String,
    /// Why the answer is what it is
    pub explanation: String,
    /// Optional free-form category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Tags for organization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Optional difficulty; `None` means unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// When this question was created
    pub created_at: DateTime<Utc>,
    /// When this question was last updated
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Create a new question from input, with a fresh id and timestamps
    ///
    /// This is the single creation path shared by manual entry and CSV import.
    pub fn new(input: QuestionInput) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            question: input.question,
            answer: input.answer,
            explanation: input.explanation,
            category: input.category,
            tags: input.tags,
            difficulty: input.difficulty,
            created_at: now,
            updated_at: now,
        }
    }

    /// True if the question has never been edited since creation
    pub fn is_unedited(&self) -> bool {
        self.created_at == self.updated_at
    }

    /// Check that every required text field is non-empty
    pub fn check_required(&self) -> Result<(), ValidationError> {
        check_required_fields(&self.question, &self.answer, &self.explanation)
    }

    /// Merge a patch onto this question and refresh `updated_at`
    ///
    /// Returns an error (and leaves the question untouched) if the patch
    /// would blank out a required field.
    pub fn apply(&mut self, patch: QuestionPatch) -> Result<(), ValidationError> {
        for (name, value) in [
            ("question", &patch.question),
            ("answer", &patch.answer),
            ("explanation", &patch.explanation),
        ] {
            if let Some(text) = value {
                if text.trim().is_empty() {
                    return Err(ValidationError::new(format!("{} must not be empty", name)));
                }
            }
        }

        if let Some(question) = patch.question {
            self.question = question;
        }
        if let Some(answer) = patch.answer {
            self.answer = answer;
        }
        if let Some(explanation) = patch.explanation {
            self.explanation = explanation;
        }
        patch.category.apply_to(&mut self.category);
        match patch.tags {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(tags) => self.tags = tags,
            FieldUpdate::Clear => self.tags.clear(),
        }
        patch.difficulty.apply_to(&mut self.difficulty);

        self.touch();
        Ok(())
    }

    /// Refresh `updated_at`, never moving it before `created_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Whether the question carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Generate a fresh question id
pub fn generate_id() -> String {
    format!("q_{}", Uuid::new_v4().simple())
}

fn check_required_fields(
    question: &str,
    answer: &str,
    explanation: &str,
) -> Result<(), ValidationError> {
    for (name, value) in [
        ("question", question),
        ("answer", answer),
        ("explanation", explanation),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::new(format!("{} must not be empty", name)));
        }
    }
    Ok(())
}

/// Fields supplied when creating a question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub question: String,
    pub answer: String,
    pub explanation: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl QuestionInput {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            explanation: explanation.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Check that every required text field is non-empty
    pub fn check_required(&self) -> Result<(), ValidationError> {
        check_required_fields(&self.question, &self.answer, &self.explanation)
    }

    /// Clean up form input the way the entry form does before saving
    ///
    /// Trims text fields, turns a blank category into none, and trims,
    /// de-duplicates and drops empty tags (first occurrence wins).
    pub fn normalized(self) -> Self {
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Self {
            question: self.question.trim().to_string(),
            answer: self.answer.trim().to_string(),
            explanation: self.explanation.trim().to_string(),
            category,
            tags: normalize_tags(self.tags),
            difficulty: self.difficulty,
        }
    }

    /// Validate input with the entry form's rules
    ///
    /// Unlike [`QuestionInput::check_required`], this reports every failing
    /// field and enforces minimum lengths.
    pub fn validate_form(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let question = self.question.trim();
        if question.is_empty() {
            errors.push(FieldError::new("question", "question is required"));
        } else if question.chars().count() < MIN_QUESTION_LEN {
            errors.push(FieldError::new(
                "question",
                format!("question must be at least {} characters", MIN_QUESTION_LEN),
            ));
        }

        if self.answer.trim().is_empty() {
            errors.push(FieldError::new("answer", "answer is required"));
        }

        let explanation = self.explanation.trim();
        if explanation.is_empty() {
            errors.push(FieldError::new("explanation", "explanation is required"));
        } else if explanation.chars().count() < MIN_EXPLANATION_LEN {
            errors.push(FieldError::new(
                "explanation",
                format!(
                    "explanation must be at least {} characters",
                    MIN_EXPLANATION_LEN
                ),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Trim tags, drop empty ones and remove duplicates, keeping first occurrence
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// A single form field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An explicit per-field change for optional fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate<T> {
    /// Leave the field as it is
    Keep,
    /// Replace the field's value
    Set(T),
    /// Remove the field's value
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Keep
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    fn apply_to(self, target: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(value) => *target = Some(value),
            FieldUpdate::Clear => *target = None,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some` sets the value, `None` keeps it
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Keep,
        }
    }
}

/// A partial update to an existing question
///
/// Required text fields are replaced only when `Some`. Optional fields use
/// [`FieldUpdate`], so "not mentioned" and "clear it" are distinct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub explanation: Option<String>,
    pub category: FieldUpdate<String>,
    pub tags: FieldUpdate<Vec<String>>,
    pub difficulty: FieldUpdate<Difficulty>,
}

impl QuestionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = FieldUpdate::Set(category.into());
        self
    }

    pub fn clear_category(mut self) -> Self {
        self.category = FieldUpdate::Clear;
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = FieldUpdate::Set(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn clear_tags(mut self) -> Self {
        self.tags = FieldUpdate::Clear;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = FieldUpdate::Set(difficulty);
        self
    }

    pub fn clear_difficulty(mut self) -> Self {
        self.difficulty = FieldUpdate::Clear;
        self
    }

    /// True if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.answer.is_none()
            && self.explanation.is_none()
            && self.category.is_keep()
            && self.tags.is_keep()
            && self.difficulty.is_keep()
    }
}

impl From<QuestionInput> for QuestionPatch {
    /// Every field of the input is applied; absent optional fields are kept
    fn from(input: QuestionInput) -> Self {
        Self {
            question: Some(input.question),
            answer: Some(input.answer),
            explanation: Some(input.explanation),
            category: input.category.into(),
            tags: if input.tags.is_empty() {
                FieldUpdate::Keep
            } else {
                FieldUpdate::Set(input.tags)
            },
            difficulty: input.difficulty.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(
            QuestionInput::new("What is 2+2?", "4", "Basic arithmetic")
                .with_category("math")
                .with_tags(["arithmetic", "easy-ones"])
                .with_difficulty(Difficulty::Easy),
        )
    }

    #[test]
    fn test_question_new() {
        let q = sample();
        assert!(q.id.starts_with("q_"));
        assert_eq!(q.question, "What is 2+2?");
        assert_eq!(q.category.as_deref(), Some("math"));
        assert_eq!(q.created_at, q.updated_at);
        assert!(q.is_unedited());
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = Question::new(QuestionInput::new("a", "b", "c"));
        let b = Question::new(QuestionInput::new("a", "b", "c"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("Easy".parse::<Difficulty>().is_err());
        assert!("bogus".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_rank() {
        assert!(Difficulty::rank(Some(Difficulty::Easy)) < Difficulty::rank(Some(Difficulty::Medium)));
        assert!(Difficulty::rank(Some(Difficulty::Medium)) < Difficulty::rank(Some(Difficulty::Hard)));
        assert!(Difficulty::rank(Some(Difficulty::Hard)) < Difficulty::rank(None));
    }

    #[test]
    fn test_apply_category_only() {
        let mut q = sample();
        let before = q.clone();
        std::thread::sleep(std::time::Duration::from_millis(5));

        q.apply(QuestionPatch::new().category("X")).unwrap();

        assert_eq!(q.category.as_deref(), Some("X"));
        assert_eq!(q.question, before.question);
        assert_eq!(q.answer, before.answer);
        assert_eq!(q.explanation, before.explanation);
        assert_eq!(q.tags, before.tags);
        assert_eq!(q.difficulty, before.difficulty);
        assert_eq!(q.created_at, before.created_at);
        assert!(q.updated_at > before.updated_at);
    }

    #[test]
    fn test_apply_clear_fields() {
        let mut q = sample();
        q.apply(
            QuestionPatch::new()
                .clear_category()
                .clear_tags()
                .clear_difficulty(),
        )
        .unwrap();

        assert!(q.category.is_none());
        assert!(q.tags.is_empty());
        assert!(q.difficulty.is_none());
    }

    #[test]
    fn test_apply_rejects_blank_required_field() {
        let mut q = sample();
        let before = q.clone();

        let err = q.apply(QuestionPatch::new().category("new").answer("  ")).unwrap_err();
        assert!(err.to_string().contains("answer"));
        assert_eq!(q, before);
    }

    #[test]
    fn test_touch_never_precedes_created() {
        let mut q = sample();
        q.created_at = Utc::now() + chrono::Duration::hours(1);
        q.touch();
        assert!(q.created_at <= q.updated_at);
    }

    #[test]
    fn test_input_check_required() {
        assert!(QuestionInput::new("q", "a", "e").check_required().is_ok());
        let err = QuestionInput::new("q", "", "e").check_required().unwrap_err();
        assert!(err.to_string().contains("answer"));
    }

    #[test]
    fn test_validate_form_reports_every_field() {
        let errors = QuestionInput::new("abc", "", "short").validate_form().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["question", "answer", "explanation"]);

        assert!(QuestionInput::new("What is Rust?", "A language", "Rust is a systems language")
            .validate_form()
            .is_ok());
    }

    #[test]
    fn test_normalized() {
        let input = QuestionInput::new("  q  ", " a ", " e ")
            .with_category("   ")
            .with_tags([" rust ", "", "rust", "cli"]);
        let input = input.normalized();
        assert_eq!(input.question, "q");
        assert_eq!(input.answer, "a");
        assert!(input.category.is_none());
        assert_eq!(input.tags, vec!["rust", "cli"]);
    }

    #[test]
    fn test_patch_from_input_keeps_absent_optionals() {
        let patch: QuestionPatch = QuestionInput::new("q", "a", "e").into();
        assert!(patch.category.is_keep());
        assert!(patch.tags.is_keep());
        assert!(patch.difficulty.is_keep());
        assert!(!patch.is_empty());
        assert!(QuestionPatch::new().is_empty());
    }

    #[test]
    fn test_question_serialization() {
        let q = sample();
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"difficulty\":\"easy\""));

        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let q = Question::new(QuestionInput::new("q", "a", "e"));
        let json = serde_json::to_string(&q).unwrap();
        assert!(!json.contains("category"));
        assert!(!json.contains("tags"));
        assert!(!json.contains("difficulty"));
    }
}
