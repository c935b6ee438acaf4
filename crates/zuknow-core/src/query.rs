//! Filtering, searching, sorting and statistics
//!
//! Everything here reads a snapshot of the collection and never mutates it.
//! Results borrow from the snapshot and keep its order unless sorted.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{Difficulty, Question};

/// Questions whose category equals `category` exactly
pub fn by_category<'a>(questions: &'a [Question], category: &str) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|q| q.category.as_deref() == Some(category))
        .collect()
}

/// Questions carrying `tag`
pub fn by_tag<'a>(questions: &'a [Question], tag: &str) -> Vec<&'a Question> {
    questions.iter().filter(|q| q.has_tag(tag)).collect()
}

/// Questions with the given difficulty; `None` selects unspecified ones
pub fn by_difficulty(questions: &[Question], difficulty: Option<Difficulty>) -> Vec<&Question> {
    questions
        .iter()
        .filter(|q| q.difficulty == difficulty)
        .collect()
}

/// Case-insensitive substring search over question, answer, explanation,
/// category and tags. An empty keyword matches everything.
pub fn search<'a>(questions: &'a [Question], keyword: &str) -> Vec<&'a Question> {
    let needle = keyword.to_lowercase();
    questions
        .iter()
        .filter(|q| matches_keyword(q, &needle))
        .collect()
}

/// `needle` must already be lowercased
fn matches_keyword(question: &Question, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(&question.question)
        || contains(&question.answer)
        || contains(&question.explanation)
        || question.category.as_deref().is_some_and(contains)
        || question.tags.iter().any(|t| contains(t))
}

/// Field to sort a listing by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Category,
    Difficulty,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Category => "category",
            SortField::Difficulty => "difficulty",
        }
    }

    fn compare(&self, a: &Question, b: &Question) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Category => a
                .category
                .as_deref()
                .unwrap_or("")
                .cmp(b.category.as_deref().unwrap_or("")),
            SortField::Difficulty => {
                Difficulty::rank(a.difficulty).cmp(&Difficulty::rank(b.difficulty))
            }
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "created_at" | "created" | "createdat" => Ok(SortField::CreatedAt),
            "updated_at" | "updated" | "updatedat" => Ok(SortField::UpdatedAt),
            "category" => Ok(SortField::Category),
            "difficulty" => Ok(SortField::Difficulty),
            _ => Err(format!(
                "unknown sort field '{}' (expected created_at, updated_at, category or difficulty)",
                s
            )),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("unknown sort order '{}' (expected asc or desc)", s)),
        }
    }
}

/// Sort a listing in place
///
/// The sort is stable and `Desc` reverses the comparator rather than the
/// result, so questions with equal keys keep their relative order either way.
pub fn sort_by(questions: &mut [&Question], field: SortField, order: SortOrder) {
    questions.sort_by(|a, b| {
        let ordering = field.compare(a, b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// A conjunction of criteria; unset criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    /// `Some(None)` selects questions without a difficulty
    pub difficulty: Option<Option<Difficulty>>,
    pub keyword: Option<String>,
}

impl QuestionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.tag.is_none()
            && self.difficulty.is_none()
            && self.keyword.is_none()
    }

    pub fn matches(&self, question: &Question) -> bool {
        if let Some(category) = &self.category {
            if question.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !question.has_tag(tag) {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if question.difficulty != difficulty {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !matches_keyword(question, &keyword.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, questions: &'a [Question]) -> Vec<&'a Question> {
        questions.iter().filter(|q| self.matches(q)).collect()
    }
}

/// Count of questions per difficulty, with unspecified as its own bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DifficultyHistogram {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub unspecified: usize,
}

impl DifficultyHistogram {
    pub fn count(&self, difficulty: Option<Difficulty>) -> usize {
        match difficulty {
            Some(Difficulty::Easy) => self.easy,
            Some(Difficulty::Medium) => self.medium,
            Some(Difficulty::Hard) => self.hard,
            None => self.unspecified,
        }
    }

    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard + self.unspecified
    }

    fn record(&mut self, difficulty: Option<Difficulty>) {
        match difficulty {
            Some(Difficulty::Easy) => self.easy += 1,
            Some(Difficulty::Medium) => self.medium += 1,
            Some(Difficulty::Hard) => self.hard += 1,
            None => self.unspecified += 1,
        }
    }
}

/// Aggregate figures over a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    /// Distinct categories, in order of first appearance
    pub categories: Vec<String>,
    /// Distinct tags, in order of first appearance
    pub tags: Vec<String>,
    pub difficulty: DifficultyHistogram,
}

impl Statistics {
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

/// Compute statistics for a collection
pub fn statistics(questions: &[Question]) -> Statistics {
    let mut stats = Statistics {
        total: questions.len(),
        ..Statistics::default()
    };

    for question in questions {
        if let Some(category) = question.category.as_ref().filter(|c| !c.is_empty()) {
            if !stats.categories.contains(category) {
                stats.categories.push(category.clone());
            }
        }
        for tag in &question.tags {
            if !stats.tags.contains(tag) {
                stats.tags.push(tag.clone());
            }
        }
        stats.difficulty.record(question.difficulty);
    }

    stats
}

/// Distinct tags with how many questions carry each, in first-appearance order
pub fn tag_counts(questions: &[Question]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for question in questions {
        for tag in &question.tags {
            match counts.iter_mut().find(|(name, _)| name == tag) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
    }
    counts
}

/// Distinct categories with their question counts, in first-appearance order
pub fn category_counts(questions: &[Question]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let categories = questions
        .iter()
        .filter_map(|q| q.category.as_ref())
        .filter(|c| !c.is_empty());
    for category in categories {
        match counts.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category.clone(), 1)),
        }
    }
    counts
}
