//! Statistics, tag and category listings

use anyhow::Result;

use zuknow_core::query;
use zuknow_core::QuestionRepository;

use crate::output::Output;

/// Show collection statistics
pub fn show(repo: &QuestionRepository, output: &Output) -> Result<()> {
    let stats = query::statistics(repo.questions());
    output.print_statistics(&stats);
    Ok(())
}

/// List all tags with usage counts
pub fn tags(repo: &QuestionRepository, output: &Output) -> Result<()> {
    let tags = query::tag_counts(repo.questions());
    output.print_counts("tag", &tags);
    Ok(())
}

/// List all categories with usage counts
pub fn categories(repo: &QuestionRepository, output: &Output) -> Result<()> {
    let categories = query::category_counts(repo.questions());
    output.print_counts("category", &categories);
    Ok(())
}
