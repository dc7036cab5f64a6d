use std::collections::HashMap;

use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizQuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("a question needs at least two options")]
    TooFewOptions,

    #[error("correct answer {index} is out of range for {len} options")]
    CorrectAnswerOutOfRange { index: usize, len: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question with a fixed option order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
}

impl QuizQuestion {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuizQuestionError` if the prompt is blank, fewer than two
    /// options are given, or `correct_answer` does not index an option.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuizQuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuizQuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuizQuestionError::TooFewOptions);
        }
        if correct_answer >= options.len() {
            return Err(QuizQuestionError::CorrectAnswerOutOfRange {
                index: correct_answer,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_answer,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    /// Shown after the quiz is submitted.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, chosen: usize) -> bool {
        chosen == self.correct_answer
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// Chosen option index per question id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizAnswers {
    chosen: HashMap<QuestionId, usize>,
}

impl QuizAnswers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or replaces) the chosen option for a question.
    pub fn choose(&mut self, question: QuestionId, option: usize) {
        self.chosen.insert(question, option);
    }

    #[must_use]
    pub fn with(mut self, question: QuestionId, option: usize) -> Self {
        self.choose(question, option);
        self
    }

    #[must_use]
    pub fn get(&self, question: &QuestionId) -> Option<usize> {
        self.chosen.get(question).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// True when every question has a chosen option.
    #[must_use]
    pub fn is_complete_for(&self, questions: &[QuizQuestion]) -> bool {
        questions.iter().all(|q| self.chosen.contains_key(q.id()))
    }

    /// Questions that still lack an answer, in quiz order.
    #[must_use]
    pub fn unanswered<'a>(&self, questions: &'a [QuizQuestion]) -> Vec<&'a QuestionId> {
        questions
            .iter()
            .map(QuizQuestion::id)
            .filter(|id| !self.chosen.contains_key(*id))
            .collect()
    }
}

impl FromIterator<(QuestionId, usize)> for QuizAnswers {
    fn from_iter<T: IntoIterator<Item = (QuestionId, usize)>>(iter: T) -> Self {
        Self {
            chosen: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn question(id: &str, correct: usize) -> QuizQuestion {
        QuizQuestion::new(
            qid(id),
            "Which function runs only once?",
            vec!["loop()".into(), "setup()".into(), "begin()".into()],
            correct,
            "setup() runs once.",
        )
        .unwrap()
    }

    #[test]
    fn rejects_out_of_range_answer() {
        let err = QuizQuestion::new(qid("q1"), "Pick", vec!["a".into(), "b".into()], 2, "")
            .unwrap_err();
        assert_eq!(
            err,
            QuizQuestionError::CorrectAnswerOutOfRange { index: 2, len: 2 }
        );
    }

    #[test]
    fn rejects_single_option() {
        let err = QuizQuestion::new(qid("q1"), "Pick", vec!["a".into()], 0, "").unwrap_err();
        assert_eq!(err, QuizQuestionError::TooFewOptions);
    }

    #[test]
    fn completeness_tracks_every_question() {
        let questions = vec![question("q1", 1), question("q2", 0)];
        let mut answers = QuizAnswers::new().with(qid("q1"), 1);
        assert!(!answers.is_complete_for(&questions));
        assert_eq!(answers.unanswered(&questions), vec![&qid("q2")]);

        answers.choose(qid("q2"), 2);
        assert!(answers.is_complete_for(&questions));
        assert!(answers.unanswered(&questions).is_empty());
    }
}
