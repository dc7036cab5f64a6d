use learn_core::model::{ProgressBook, User};

use crate::progress_service::ProgressSource;

/// Everything the learning handlers need about the signed-in learner.
///
/// Passed explicitly to each call; the service only replaces a field after
/// the matching write has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerSession {
    pub(crate) user: User,
    pub(crate) progress: ProgressBook,
    pub(crate) source: ProgressSource,
}

impl LearnerSession {
    #[must_use]
    pub fn new(user: User, progress: ProgressBook, source: ProgressSource) -> Self {
        Self {
            user,
            progress,
            source,
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressBook {
        &self.progress
    }

    /// Where the progress book was loaded from.
    #[must_use]
    pub fn source(&self) -> ProgressSource {
        self.source
    }
}
