mod outcome;
mod service;
mod session;

// Public API of the learning subsystem.
pub use crate::error::SessionError;
pub use outcome::{CodeOutcome, LessonOutcome, QuizOutcome};
pub use service::LearningService;
pub use session::LearnerSession;
