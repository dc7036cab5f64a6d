use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::LessonId;
use crate::model::quiz::QuizQuestion;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("quiz lesson has no questions")]
    EmptyQuiz,

    #[error("duplicate question id in quiz: {0}")]
    DuplicateQuestion(String),

    #[error("code lesson has no required tokens")]
    NoRequiredTokens,
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// What a learner does to complete a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonKind {
    /// Read-only material, completed by marking it done.
    Theory,
    /// A code exercise checked for required tokens.
    Code {
        template: Option<String>,
        expected_output: Option<String>,
        required_tokens: Vec<String>,
    },
    /// A multiple-choice quiz, completed by passing the grader.
    Quiz { questions: Vec<QuizQuestion> },
    /// Interactive simulation, completed by marking it done.
    Simulation,
}

impl LessonKind {
    /// Stable lowercase tag, matching the catalogue's `type` field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonKind::Theory => "theory",
            LessonKind::Code { .. } => "code",
            LessonKind::Quiz { .. } => "quiz",
            LessonKind::Simulation => "simulation",
        }
    }

    /// True for lessons a learner may mark complete without a grader.
    #[must_use]
    pub fn is_self_paced(&self) -> bool {
        matches!(self, LessonKind::Theory | LessonKind::Simulation)
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    content: String,
    xp_reward: u32,
    kind: LessonKind,
}

impl Lesson {
    /// Creates a validated lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the title is blank, a quiz has no questions or
    /// repeats a question id, or a code exercise lists no required tokens.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        content: impl Into<String>,
        xp_reward: u32,
        kind: LessonKind,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        match &kind {
            LessonKind::Quiz { questions } => {
                if questions.is_empty() {
                    return Err(LessonError::EmptyQuiz);
                }
                let mut seen = HashSet::with_capacity(questions.len());
                for q in questions {
                    if !seen.insert(q.id()) {
                        return Err(LessonError::DuplicateQuestion(q.id().to_string()));
                    }
                }
            }
            LessonKind::Code {
                required_tokens, ..
            } => {
                if required_tokens.iter().all(|t| t.trim().is_empty()) {
                    return Err(LessonError::NoRequiredTokens);
                }
            }
            LessonKind::Theory | LessonKind::Simulation => {}
        }

        Ok(Self {
            id,
            title,
            content: content.into(),
            xp_reward,
            kind,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Markdown body shown to the learner.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn xp_reward(&self) -> u32 {
        self.xp_reward
    }

    #[must_use]
    pub fn kind(&self) -> &LessonKind {
        &self.kind
    }

    /// Quiz questions, or `None` for non-quiz lessons.
    #[must_use]
    pub fn quiz(&self) -> Option<&[QuizQuestion]> {
        match &self.kind {
            LessonKind::Quiz { questions } => Some(questions),
            _ => None,
        }
    }

    /// Required tokens, or `None` for non-code lessons.
    #[must_use]
    pub fn required_tokens(&self) -> Option<&[String]> {
        match &self.kind {
            LessonKind::Code {
                required_tokens, ..
            } => Some(required_tokens),
            _ => None,
        }
    }
}
