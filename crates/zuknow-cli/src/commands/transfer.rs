//! Import, export and clear

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use zuknow_core::codec::{self, default_export_filename};
use zuknow_core::{ImportMode, QuestionRepository};

use crate::editor::confirm;
use crate::output::Output;

/// Export every question as a JSON envelope
///
/// Writes to `output_path`, or to `zuknow_questions_YYYY-MM-DD.json` in the
/// current directory. A path of `-` writes to stdout.
pub fn export(
    repo: &QuestionRepository,
    output_path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let content = codec::export_json(repo.questions()).context("Failed to encode export")?;

    let path = output_path
        .unwrap_or_else(|| PathBuf::from(default_export_filename(Utc::now().date_naive())));

    if path.as_os_str() == "-" {
        println!("{}", content);
        return Ok(());
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write export file: {:?}", path))?;

    output.success(&format!(
        "Exported {} question(s) to {}",
        repo.len(),
        path.display()
    ));
    Ok(())
}

/// Import questions from a JSON or CSV file
pub fn import(
    repo: &mut QuestionRepository,
    path: PathBuf,
    replace: bool,
    output: &Output,
) -> Result<()> {
    let questions = codec::read_import_file(&path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Append
    };
    let summary = repo
        .import(questions, mode)
        .context("Failed to store imported questions")?;

    if output.is_json() {
        output.print_json(&serde_json::json!({
            "status": "success",
            "added": summary.added,
            "replaced": summary.replaced,
            "total": summary.total
        }));
    } else {
        output.success(&format!(
            "Imported {} question(s) ({} new, {} replaced); {} total",
            summary.added + summary.replaced,
            summary.added,
            summary.replaced,
            summary.total
        ));
    }
    Ok(())
}

/// Delete every question
pub fn clear(repo: &mut QuestionRepository, yes: bool, output: &Output) -> Result<()> {
    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to clear without --yes");
        }
        println!("This deletes all {} question(s).", repo.len());
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = repo.len();
    repo.clear_all().context("Failed to clear questions")?;

    output.success(&format!("Deleted {} question(s)", count));
    Ok(())
}
