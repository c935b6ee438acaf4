//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use zuknow_core::{Question, QuizOutcome, Statistics};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print a single question in full
    pub fn print_question(&self, question: &Question) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", question.id);
                println!("Question:    {}", question.question);
                println!("Answer:      {}", question.answer);
                println!("Explanation: {}", question.explanation);
                if let Some(ref category) = question.category {
                    println!("Category:    {}", category);
                }
                if !question.tags.is_empty() {
                    println!("Tags:        {}", question.tags.join(", "));
                }
                println!("Difficulty:  {}", difficulty_label(question));
                println!(
                    "Created:     {}",
                    question.created_at.format("%Y-%m-%d %H:%M")
                );
                if !question.is_unedited() {
                    println!(
                        "Updated:     {}",
                        question.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
            OutputFormat::Json => self.print_json(question),
            OutputFormat::Quiet => {
                println!("{}", question.id);
            }
        }
    }

    /// Print a list of questions
    pub fn print_questions(&self, questions: &[&Question]) {
        match self.format {
            OutputFormat::Human => {
                if questions.is_empty() {
                    println!("No questions found.");
                    return;
                }
                for question in questions {
                    println!(
                        "{} | {} | {} | {}",
                        short_id(&question.id),
                        truncate(&question.question, 45),
                        truncate(question.category.as_deref().unwrap_or("-"), 15),
                        difficulty_label(question)
                    );
                }
                println!("\n{} question(s)", questions.len());
            }
            OutputFormat::Json => self.print_json(questions),
            OutputFormat::Quiet => {
                for question in questions {
                    println!("{}", question.id);
                }
            }
        }
    }

    /// Print a prompt for the quiz (without the answer)
    pub fn print_quiz_prompt(&self, question: &Question) {
        if self.format != OutputFormat::Human {
            return;
        }
        println!("Question: {}", question.question);
        if let Some(ref category) = question.category {
            println!("Category: {}", category);
        }
    }

    /// Print how a quiz answer was graded
    pub fn print_outcome(&self, question: &Question, outcome: &QuizOutcome) {
        match self.format {
            OutputFormat::Human => {
                println!();
                if outcome.correct {
                    println!("✓ Correct!");
                } else {
                    println!("✗ Incorrect. The answer is: {}", outcome.expected);
                }
                println!();
                println!("Explanation: {}", outcome.explanation);
            }
            OutputFormat::Json => {
                self.print_json(&serde_json::json!({
                    "id": question.id,
                    "question": question.question,
                    "correct": outcome.correct,
                    "expected": outcome.expected,
                    "explanation": outcome.explanation
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", if outcome.correct { "correct" } else { "incorrect" });
            }
        }
    }

    /// Print collection statistics
    pub fn print_statistics(&self, stats: &Statistics) {
        match self.format {
            OutputFormat::Human => {
                println!("Questions:  {}", stats.total);
                println!("Categories: {}", stats.category_count());
                println!("Tags:       {}", stats.tag_count());
                println!();
                println!("By difficulty:");
                println!("  easy:        {}", stats.difficulty.easy);
                println!("  medium:      {}", stats.difficulty.medium);
                println!("  hard:        {}", stats.difficulty.hard);
                println!("  unspecified: {}", stats.difficulty.unspecified);
            }
            OutputFormat::Json => self.print_json(stats),
            OutputFormat::Quiet => {
                println!("{}", stats.total);
            }
        }
    }

    /// Print labels (tags or categories) with usage counts
    pub fn print_counts(&self, noun: &str, counts: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if counts.is_empty() {
                    println!("No {} found.", plural(noun));
                    return;
                }
                for (name, count) in counts {
                    println!("{} ({})", name, count);
                }
                println!("\n{} {}(s)", counts.len(), noun);
            }
            OutputFormat::Json => {
                let json: Vec<_> = counts
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                self.print_json(&json);
            }
            OutputFormat::Quiet => {
                for (name, _) in counts {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn difficulty_label(question: &Question) -> &'static str {
    question
        .difficulty
        .map(|d| d.as_str())
        .unwrap_or("unspecified")
}

fn plural(noun: &str) -> String {
    match noun.strip_suffix('y') {
        Some(stem) => format!("{}ies", stem),
        None => format!("{}s", noun),
    }
}

/// First characters of an id, enough to pass back as a prefix
pub fn short_id(id: &str) -> &str {
    let end = id.char_indices().nth(10).map_or(id.len(), |(i, _)| i);
    &id[..end]
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("日本語の問題文です", 6), "日本語...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("q_0123456789abcdef"), "q_01234567");
        assert_eq!(short_id("q_1"), "q_1");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural("tag"), "tags");
        assert_eq!(plural("category"), "categories");
    }
}
