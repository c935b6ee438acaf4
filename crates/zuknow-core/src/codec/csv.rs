//! CSV import
//!
//! The format is deliberately simple: every line is split on bare commas,
//! so quoted fields cannot contain commas. Each field is trimmed and one
//! leading and one trailing `"` are stripped.
//!
//! ```text
//! question,answer,explanation,category,tags,difficulty
//! "2+2?","4","basic arithmetic","math","numbers;easy-ones","easy"
//! ```

use tracing::{debug, warn};

use super::CodecResult;
use crate::error::ValidationError;
use crate::models::{normalize_tags, Difficulty, Question, QuestionInput};

/// Columns every CSV import must have
pub const REQUIRED_COLUMNS: [&str; 3] = ["question", "answer", "explanation"];

/// Import questions from CSV content
///
/// Rows are numbered from 1 with the header as row 1, ignoring blank
/// lines. Every row becomes a brand-new question. Unknown difficulty
/// values are treated as unspecified.
pub fn import_csv(content: &str) -> CodecResult<Vec<Question>> {
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();

    if lines.len() < 2 {
        return Err(ValidationError::new("CSV file contains no data rows").into());
    }

    let headers = split_line(lines[0]);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == col))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::new(format!(
            "missing required column(s): {}",
            missing.join(", ")
        ))
        .into());
    }

    let column = |name: &str| headers.iter().position(|h| h == name);
    let question_col = column("question");
    let answer_col = column("answer");
    let explanation_col = column("explanation");
    let category_col = column("category");
    let tags_col = column("tags");
    let difficulty_col = column("difficulty");

    let mut questions = Vec::with_capacity(lines.len() - 1);

    for (index, line) in lines.iter().enumerate().skip(1) {
        let row = index + 1;
        let values = split_line(line);

        if values.len() != headers.len() {
            warn!("Rejected CSV row {}: column count mismatch", row);
            return Err(ValidationError::at(
                row,
                format!(
                    "expected {} columns, found {}",
                    headers.len(),
                    values.len()
                ),
            )
            .into());
        }

        let field = |col: Option<usize>| col.map(|i| values[i].as_str()).unwrap_or("");

        let mut input = QuestionInput::new(
            field(question_col),
            field(answer_col),
            field(explanation_col),
        );
        input
            .check_required()
            .map_err(|e| ValidationError::at(row, e.reason))?;

        let category = field(category_col);
        if !category.is_empty() {
            input.category = Some(category.to_string());
        }
        input.tags = normalize_tags(field(tags_col).split(';'));
        input.difficulty = field(difficulty_col).parse::<Difficulty>().ok();

        questions.push(Question::new(input));
    }

    debug!("Parsed {} CSV row(s)", questions.len());
    Ok(questions)
}

/// Split a line on commas and clean each field
fn split_line(line: &str) -> Vec<String> {
    line.split(',').map(clean_field).collect()
}

fn clean_field(raw: &str) -> String {
    let field = raw.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    let field = field.strip_suffix('"').unwrap_or(field);
    field.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;

    fn position(err: CodecError) -> Option<usize> {
        match err {
            CodecError::Validation(e) => e.position,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_unknown_difficulty_is_unspecified() {
        let content = "question,answer,explanation,difficulty\n\"2+2?\",\"4\",\"basic arithmetic\",\"bogus\"\n";
        let questions = import_csv(content).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "2+2?");
        assert_eq!(questions[0].answer, "4");
        assert_eq!(questions[0].explanation, "basic arithmetic");
        assert!(questions[0].difficulty.is_none());
    }

    #[test]
    fn test_full_row() {
        let content = "question,answer,explanation,category,tags,difficulty\r\n\
                       What is Rust?,A language,Systems programming,tech,rust; lang ;rust,hard\r\n";
        let questions = import_csv(content).unwrap();

        let q = &questions[0];
        assert_eq!(q.category.as_deref(), Some("tech"));
        assert_eq!(q.tags, vec!["rust", "lang"]);
        assert_eq!(q.difficulty, Some(Difficulty::Hard));
        assert!(q.id.starts_with("q_"));
        assert_eq!(q.created_at, q.updated_at);
    }

    #[test]
    fn test_columns_in_any_order() {
        let content = "explanation,question,answer\ne1,q1,a1\n";
        let questions = import_csv(content).unwrap();
        assert_eq!(questions[0].question, "q1");
        assert_eq!(questions[0].answer, "a1");
        assert_eq!(questions[0].explanation, "e1");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let content = "\nquestion,answer,explanation\n\n q1 , a1 , e1 \n\n";
        let questions = import_csv(content).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "q1");
    }

    #[test]
    fn test_empty_optional_columns() {
        let content = "question,answer,explanation,category,tags\nq,a,e,,\n";
        let questions = import_csv(content).unwrap();
        assert!(questions[0].category.is_none());
        assert!(questions[0].tags.is_empty());
    }

    #[test]
    fn test_missing_required_columns() {
        let err = import_csv("question,category\nq,c\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("answer"));
        assert!(message.contains("explanation"));
    }

    #[test]
    fn test_column_count_mismatch_names_row() {
        let content = "question,answer,explanation\nq1,a1,e1\nq2,a2\n";
        assert_eq!(position(import_csv(content).unwrap_err()), Some(3));
    }

    #[test]
    fn test_embedded_comma_splits_field() {
        let content = "question,answer,explanation\n\"a, b\",c,d\n";
        assert_eq!(position(import_csv(content).unwrap_err()), Some(2));
    }

    #[test]
    fn test_empty_required_field() {
        let content = "question,answer,explanation\nq1,,e1\n";
        let err = import_csv(content).unwrap_err();
        assert!(err.to_string().contains("answer"));
        assert_eq!(position(err), Some(2));
    }

    #[test]
    fn test_no_data_rows() {
        assert!(import_csv("").is_err());
        assert!(import_csv("question,answer,explanation\n").is_err());
    }

    #[test]
    fn test_rows_get_distinct_ids() {
        let content = "question,answer,explanation\nq,a,e\nq,a,e\n";
        let questions = import_csv(content).unwrap();
        assert_ne!(questions[0].id, questions[1].id);
    }
}
