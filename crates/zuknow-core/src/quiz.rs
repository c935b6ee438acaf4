//! Quiz helpers
//!
//! The current-question pointer belongs to the caller, not the repository.
//! [`Selection`] holds it and knows how to react when questions go away.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::models::Question;

/// Compare a given answer with the expected one
///
/// Both sides are trimmed and lowercased; anything else must match exactly.
pub fn check_answer(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}

/// Result of answering one quiz question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
    pub correct: bool,
    pub expected: String,
    pub explanation: String,
}

impl QuizOutcome {
    pub fn grade(question: &Question, given: &str) -> Self {
        Self {
            correct: check_answer(&question.answer, given),
            expected: question.answer.clone(),
            explanation: question.explanation.clone(),
        }
    }
}

/// The question currently shown to the user, by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: impl Into<String>) {
        self.current = Some(id.into());
    }

    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Look the current question up in a collection
    ///
    /// A dangling id resolves to `None`.
    pub fn resolve<'a>(&self, questions: &'a [Question]) -> Option<&'a Question> {
        let id = self.current.as_deref()?;
        questions.iter().find(|q| q.id == id)
    }

    /// Forget the current question if it was the one deleted
    pub fn on_deleted(&mut self, id: &str) {
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
    }

    /// The whole collection was cleared
    pub fn on_cleared(&mut self) {
        self.current = None;
    }

    /// Select a uniformly random question and return it
    ///
    /// An empty collection clears the selection.
    pub fn pick_random<'a, R: Rng + ?Sized>(
        &mut self,
        questions: &'a [Question],
        rng: &mut R,
    ) -> Option<&'a Question> {
        let picked = questions.choose(rng);
        self.current = picked.map(|q| q.id.clone());
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionInput;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn questions() -> Vec<Question> {
        ["first", "second", "third"]
            .iter()
            .map(|t| Question::new(QuestionInput::new(*t, "Paris", "capital city")))
            .collect()
    }

    #[test]
    fn test_check_answer() {
        assert!(check_answer("Paris", "  paris "));
        assert!(check_answer("TCP/IP", "tcp/ip"));
        assert!(!check_answer("Paris", "Pariss"));
        assert!(!check_answer("New York", "newyork"));
    }

    #[test]
    fn test_grade() {
        let q = &questions()[0];
        let outcome = QuizOutcome::grade(q, "PARIS");
        assert!(outcome.correct);
        assert_eq!(outcome.expected, "Paris");
        assert_eq!(outcome.explanation, "capital city");
        assert!(!QuizOutcome::grade(q, "Lyon").correct);
    }

    #[test]
    fn test_resolve_and_delete() {
        let questions = questions();
        let mut selection = Selection::new();
        assert!(selection.resolve(&questions).is_none());

        selection.set(questions[1].id.clone());
        assert_eq!(selection.resolve(&questions), Some(&questions[1]));

        selection.on_deleted(&questions[0].id);
        assert_eq!(selection.get(), Some(questions[1].id.as_str()));

        selection.on_deleted(&questions[1].id);
        assert!(selection.get().is_none());
    }

    #[test]
    fn test_dangling_id_resolves_to_none() {
        let mut selection = Selection::new();
        selection.set("q_gone");
        assert!(selection.resolve(&questions()).is_none());
    }

    #[test]
    fn test_on_cleared() {
        let mut selection = Selection::new();
        selection.set("q_1");
        selection.on_cleared();
        assert!(selection.get().is_none());
    }

    #[test]
    fn test_pick_random() {
        let questions = questions();
        let mut rng = StdRng::seed_from_u64(7);
        let mut selection = Selection::new();

        for _ in 0..20 {
            let picked = selection.pick_random(&questions, &mut rng).unwrap();
            assert!(questions.contains(picked));
            assert_eq!(selection.get(), Some(picked.id.as_str()));
        }

        assert!(selection.pick_random(&[], &mut rng).is_none());
        assert!(selection.get().is_none());
    }
}
