//! Question command handlers

use anyhow::{bail, Context, Result};

use zuknow_core::models::FieldError;
use zuknow_core::query::{self, QuestionFilter, SortField, SortOrder};
use zuknow_core::{Difficulty, FieldUpdate, QuestionInput, QuestionPatch, QuestionRepository};

use crate::editor::confirm;
use crate::output::{short_id, Output};

/// Fields for a new question, as given on the command line
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub explanation: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
}

/// Changes to an existing question, as given on the command line
#[derive(Default)]
pub struct QuestionEdits {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub explanation: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub clear_category: bool,
    pub clear_tags: bool,
    pub clear_difficulty: bool,
}

/// Listing options
pub struct ListOptions {
    pub category: Option<String>,
    pub tag: Option<String>,
    /// `Some(None)` means "unspecified"
    pub difficulty: Option<Option<Difficulty>>,
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

/// Create a new question
pub fn add(repo: &mut QuestionRepository, fields: NewQuestion, output: &Output) -> Result<()> {
    let input = QuestionInput {
        question: fields.question,
        answer: fields.answer,
        explanation: fields.explanation,
        category: fields.category,
        tags: fields.tags,
        difficulty: fields.difficulty,
    }
    .normalized();

    if let Err(errors) = input.validate_form() {
        bail!(describe_errors(&errors));
    }

    let question = repo.create(input).context("Failed to create question")?;

    output.success(&format!("Created question: {}", question.id));
    output.print_question(&question);

    Ok(())
}

/// List questions, filtered and sorted
pub fn list(repo: &QuestionRepository, options: ListOptions, output: &Output) -> Result<()> {
    let filter = QuestionFilter {
        category: options.category,
        tag: options.tag,
        difficulty: options.difficulty,
        keyword: options.search,
    };

    let mut questions = filter.apply(repo.questions());
    query::sort_by(&mut questions, options.sort, options.order);

    output.print_questions(&questions);
    Ok(())
}

/// Show a single question
pub fn show(repo: &QuestionRepository, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(repo, &id)?;
    let question = repo
        .get_by_id(&id)
        .ok_or_else(|| anyhow::anyhow!("Question not found: {}", id))?;

    output.print_question(question);
    Ok(())
}

/// Edit a question
pub fn edit(
    repo: &mut QuestionRepository,
    id: String,
    edits: QuestionEdits,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(repo, &id)?;
    let current = repo
        .get_by_id(&id)
        .ok_or_else(|| anyhow::anyhow!("Question not found: {}", id))?;

    let patch = build_patch(edits);
    if patch.is_empty() {
        bail!("Nothing to change. Pass at least one field to edit.");
    }

    // Form rules apply to the text fields being changed
    let candidate = QuestionInput::new(
        patch.question.as_deref().unwrap_or(&current.question),
        patch.answer.as_deref().unwrap_or(&current.answer),
        patch.explanation.as_deref().unwrap_or(&current.explanation),
    );
    if let Err(errors) = candidate.validate_form() {
        let relevant: Vec<FieldError> = errors
            .into_iter()
            .filter(|e| match e.field {
                "question" => patch.question.is_some(),
                "answer" => patch.answer.is_some(),
                "explanation" => patch.explanation.is_some(),
                _ => true,
            })
            .collect();
        if !relevant.is_empty() {
            bail!(describe_errors(&relevant));
        }
    }

    let question = repo.update(&id, patch).context("Failed to update question")?;

    output.success("Question updated");
    output.print_question(&question);

    Ok(())
}

/// Delete a question
pub fn delete(repo: &mut QuestionRepository, id: String, yes: bool, output: &Output) -> Result<()> {
    let id = resolve_id(repo, &id)?;
    let question = repo
        .get_by_id(&id)
        .ok_or_else(|| anyhow::anyhow!("Question not found: {}", id))?;

    // Confirm deletion
    if !yes && output.should_prompt() {
        println!("Delete question: {} - {}", short_id(&question.id), question.question);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    repo.delete(&id).context("Failed to delete question")?;

    output.success(&format!("Deleted question: {}", id));

    Ok(())
}

/// Search questions by keyword
pub fn search(repo: &QuestionRepository, keyword: String, output: &Output) -> Result<()> {
    let questions = query::search(repo.questions(), &keyword);
    output.print_questions(&questions);
    Ok(())
}

/// Parse a difficulty filter, where `unspecified` selects questions without one
pub fn parse_difficulty_filter(value: &str) -> Result<Option<Difficulty>, String> {
    match value {
        "unspecified" | "none" => Ok(None),
        other => other.parse().map(Some).map_err(|e| format!("{}", e)),
    }
}

/// Resolve a question id (supports full id or unique prefix)
pub fn resolve_id(repo: &QuestionRepository, id: &str) -> Result<String> {
    if repo.get_by_id(id).is_some() {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = repo
        .questions()
        .iter()
        .filter(|q| q.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No question found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple questions match '{}':", id);
            for question in &matches {
                eprintln!("  {} - {}", question.id, question.question);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

fn build_patch(edits: QuestionEdits) -> QuestionPatch {
    let category = if edits.clear_category {
        FieldUpdate::Clear
    } else {
        edits
            .category
            .map(|c| c.trim().to_string())
            .map(|c| {
                if c.is_empty() {
                    FieldUpdate::Clear
                } else {
                    FieldUpdate::Set(c)
                }
            })
            .unwrap_or_default()
    };

    let tags = if edits.clear_tags {
        FieldUpdate::Clear
    } else if edits.tags.is_empty() {
        FieldUpdate::Keep
    } else {
        FieldUpdate::Set(zuknow_core::models::normalize_tags(edits.tags))
    };

    let difficulty = if edits.clear_difficulty {
        FieldUpdate::Clear
    } else {
        edits.difficulty.into()
    };

    QuestionPatch {
        question: edits.question.map(|s| s.trim().to_string()),
        answer: edits.answer.map(|s| s.trim().to_string()),
        explanation: edits.explanation.map(|s| s.trim().to_string()),
        category,
        tags,
        difficulty,
    }
}

fn describe_errors(errors: &[FieldError]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
    format!("Invalid question:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_difficulty_filter() {
        assert_eq!(parse_difficulty_filter("unspecified"), Ok(None));
        assert_eq!(parse_difficulty_filter("hard"), Ok(Some(Difficulty::Hard)));
        assert!(parse_difficulty_filter("Hard").is_err());
    }

    #[test]
    fn test_build_patch_clear_flags_win() {
        let patch = build_patch(QuestionEdits {
            category: Some("math".to_string()),
            clear_category: true,
            clear_tags: true,
            difficulty: Some(Difficulty::Easy),
            clear_difficulty: true,
            ..QuestionEdits::default()
        });
        assert_eq!(patch.category, FieldUpdate::Clear);
        assert_eq!(patch.tags, FieldUpdate::Clear);
        assert_eq!(patch.difficulty, FieldUpdate::Clear);
    }

    #[test]
    fn test_build_patch_normalizes() {
        let patch = build_patch(QuestionEdits {
            answer: Some("  42 ".to_string()),
            category: Some("  ".to_string()),
            tags: vec![" a ".to_string(), "a".to_string(), "b".to_string()],
            ..QuestionEdits::default()
        });
        assert_eq!(patch.answer.as_deref(), Some("42"));
        assert_eq!(patch.category, FieldUpdate::Clear);
        assert_eq!(
            patch.tags,
            FieldUpdate::Set(vec!["a".to_string(), "b".to_string()])
        );
        assert!(patch.question.is_none());
        assert!(patch.difficulty.is_keep());
    }

    #[test]
    fn test_build_patch_empty() {
        assert!(build_patch(QuestionEdits::default()).is_empty());
    }
}
