use learn_core::achievements::Achievement;
use learn_core::grading::{CodeGrade, QuizGrade};

use crate::notice::Notice;

/// Result of trying to complete a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LessonOutcome {
    /// False when the lesson was already complete; nothing was awarded.
    pub newly_completed: bool,
    pub xp_awarded: u64,
    pub leveled_up: bool,
    pub course_completed: bool,
    pub badges: Vec<Achievement>,
    pub notices: Vec<Notice>,
}

/// Result of grading a quiz submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub grade: QuizGrade,
    /// Present when the quiz passed and completion was attempted.
    pub completion: Option<LessonOutcome>,
    pub notices: Vec<Notice>,
}

impl QuizOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.grade.passed()
    }
}

/// Result of checking a code exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeOutcome {
    pub grade: CodeGrade,
    pub completion: Option<LessonOutcome>,
    pub notices: Vec<Notice>,
}

impl CodeOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.grade.passed()
    }
}
