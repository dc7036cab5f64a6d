//! Shared error types for the services crate.

use thiserror::Error;

use learn_core::catalog::CatalogError;
use learn_core::model::{CourseId, IdentityError, LessonId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `AccountService` and identity providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("sign-in failed: {0}")]
    SignIn(String),
    #[error("sign-out failed: {0}")]
    SignOut(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("no progress recorded for course {0}")]
    MissingCourse(CourseId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LearningService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("unknown course: {0}")]
    UnknownCourse(CourseId),
    #[error("course {course} has no lesson {lesson}")]
    UnknownLesson { course: CourseId, lesson: LessonId },
    #[error("lesson {lesson} is a {kind} lesson")]
    WrongLessonKind { lesson: LessonId, kind: &'static str },
    #[error("quiz has {unanswered} unanswered question(s)")]
    IncompleteQuiz { unanswered: usize },
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted by `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
