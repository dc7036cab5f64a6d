mod course;
mod ids;
mod lesson;
mod progress;
mod quiz;
mod user;

pub use ids::{BadgeId, CourseId, LessonId, ParseIdError, QuestionId, UserId};

pub use course::{Course, CourseDraft, CourseError, Difficulty};
pub use lesson::{Lesson, LessonError, LessonKind};
pub use progress::{ProgressBook, UserProgress};
pub use quiz::{QuizAnswers, QuizQuestion, QuizQuestionError};
pub use user::{Badge, Identity, IdentityError, User};
