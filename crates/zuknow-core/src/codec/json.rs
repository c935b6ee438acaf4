//! JSON export envelope and import validation

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::{CodecError, CodecResult};
use crate::error::ValidationError;
use crate::models::{Difficulty, Question};

/// Format version written into every export
pub const EXPORT_VERSION: &str = "1.0";

/// The `metadata` block of an export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: DateTime<Utc>,
    pub version: &'static str,
    pub total_questions: usize,
}

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    metadata: ExportMetadata,
    questions: &'a [Question],
}

/// Export the collection as a pretty-printed JSON envelope dated now
pub fn export_json(questions: &[Question]) -> CodecResult<String> {
    export_json_at(questions, Utc::now())
}

/// Export the collection as a pretty-printed JSON envelope with a fixed date
pub fn export_json_at(questions: &[Question], export_date: DateTime<Utc>) -> CodecResult<String> {
    let envelope = ExportEnvelope {
        metadata: ExportMetadata {
            export_date,
            version: EXPORT_VERSION,
            total_questions: questions.len(),
        },
        questions,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Import questions from JSON
///
/// Accepts either an export envelope (an object with a `questions` array)
/// or a bare array. The first invalid record aborts the whole import.
pub fn import_json(content: &str) -> CodecResult<Vec<Question>> {
    let value: Value = serde_json::from_str(content)?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut envelope) => match envelope.remove("questions") {
            Some(Value::Array(records)) => records,
            _ => return Err(CodecError::NotAnArray),
        },
        _ => return Err(CodecError::NotAnArray),
    };

    let now = Utc::now();
    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let position = index + 1;
        let question = parse_record(record, now).map_err(|reason| {
            warn!("Rejected import record {}: {}", position, reason);
            ValidationError::at(position, reason)
        })?;

        if !seen.insert(question.id.clone()) {
            warn!("Rejected import record {}: duplicate id", position);
            return Err(
                ValidationError::at(position, format!("duplicate id '{}'", question.id)).into(),
            );
        }
        questions.push(question);
    }

    Ok(questions)
}

fn parse_record(record: &Value, now: DateTime<Utc>) -> Result<Question, String> {
    let fields = record
        .as_object()
        .ok_or_else(|| "record is not an object".to_string())?;

    let id = required_text(fields, "id")?;
    let question = required_text(fields, "question")?;
    let answer = required_text(fields, "answer")?;
    let explanation = required_text(fields, "explanation")?;

    let category = match present(fields, "category") {
        None => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err("category must be a string".to_string()),
    };

    let tags = match present(fields, "tags") {
        None => Vec::new(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| "tags must contain only strings".to_string())?,
        Some(_) => return Err("tags must be an array".to_string()),
    };

    let difficulty = match present(fields, "difficulty") {
        None => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(
            s.parse::<Difficulty>()
                .map_err(|_| format!("invalid difficulty '{}'", s))?,
        ),
        Some(other) => return Err(format!("invalid difficulty {}", other)),
    };

    let created = timestamp(fields, "createdAt")?;
    let updated = timestamp(fields, "updatedAt")?;
    let (created_at, updated_at) = match (created, updated) {
        (Some(c), Some(u)) if c > u => {
            return Err("createdAt is later than updatedAt".to_string());
        }
        (Some(c), Some(u)) => (c, u),
        (Some(c), None) => (c, now.max(c)),
        (None, Some(u)) => (now.min(u), u),
        (None, None) => (now, now),
    };

    Ok(Question {
        id,
        question,
        answer,
        explanation,
        category,
        tags,
        difficulty,
        created_at,
        updated_at,
    })
}

/// A field that is present and not null
fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

fn required_text(fields: &Map<String, Value>, name: &str) -> Result<String, String> {
    match present(fields, name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(format!("{} must not be empty", name)),
        Some(_) => Err(format!("{} must be a string", name)),
        None => Err(format!("{} is missing", name)),
    }
}

/// Parse a timestamp field; absent, null or empty means "not given"
fn timestamp(fields: &Map<String, Value>, name: &str) -> Result<Option<DateTime<Utc>>, String> {
    match present(fields, name) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| format!("{} is not a valid timestamp: '{}'", name, s)),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .map(Some)
            .ok_or_else(|| format!("{} is not a valid timestamp: {}", name, n)),
        Some(other) => Err(format!("{} is not a valid timestamp: {}", name, other)),
    }
}
