//! Quiz command handler

use anyhow::{bail, Result};
use tracing::debug;

use zuknow_core::{Question, QuestionFilter, QuestionRepository, QuizOutcome, Selection};

use crate::editor::read_line;
use crate::output::Output;

/// Ask one random question and grade the answer
///
/// The answer comes from `answer` when given, otherwise from stdin.
pub fn run(
    repo: &QuestionRepository,
    filter: QuestionFilter,
    answer: Option<String>,
    output: &Output,
) -> Result<()> {
    let pool: Vec<Question> = filter.apply(repo.questions()).into_iter().cloned().collect();

    let mut selection = Selection::new();
    let Some(question) = selection.pick_random(&pool, &mut rand::thread_rng()) else {
        if repo.is_empty() {
            bail!("No questions yet. Add one with `zuknow add`.");
        }
        bail!("No questions match the given filters.");
    };
    debug!("Quiz picked {}", question.id);

    output.print_quiz_prompt(question);

    let given = match answer {
        Some(answer) => answer,
        None => match read_line("Your answer: ")? {
            Some(line) => line,
            None => bail!("No answer given."),
        },
    };

    let outcome = QuizOutcome::grade(question, &given);
    output.print_outcome(question, &outcome);

    Ok(())
}
