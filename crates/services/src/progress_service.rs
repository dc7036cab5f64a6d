use std::sync::Arc;

use learn_core::model::{CourseId, ProgressBook, UserId};
use storage::repository::{ProgressCache, ProgressRepository};
use tracing::{debug, info, warn};

use crate::error::ProgressError;

/// Where a loaded progress book came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSource {
    /// The remote store had progress; the local cache now mirrors it.
    Remote,
    /// The remote store was empty; the local cache was used and pushed up.
    LocalHint,
    /// The remote store failed; the local cache is being used as-is.
    LocalFallback,
    /// Neither tier had anything.
    Empty,
}

impl ProgressSource {
    #[must_use]
    pub fn is_offline(self) -> bool {
        matches!(self, Self::LocalFallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedProgress {
    pub book: ProgressBook,
    pub source: ProgressSource,
}

/// Two-tier progress store: remote is the source of truth, the local cache
/// is a resumability hint.
#[derive(Clone)]
pub struct ProgressService {
    remote: Arc<dyn ProgressRepository>,
    cache: Arc<dyn ProgressCache>,
}

impl ProgressService {
    #[must_use]
    pub fn new(remote: Arc<dyn ProgressRepository>, cache: Arc<dyn ProgressCache>) -> Self {
        Self { remote, cache }
    }

    /// Load a learner's progress book.
    ///
    /// Remote wins on mismatch and overwrites the cache. An empty remote is
    /// seeded from the cache. A failing remote falls back to the cache.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` only when the remote fails and no
    /// cached copy exists.
    pub async fn load(&self, uid: &UserId) -> Result<LoadedProgress, ProgressError> {
        let cached = match self.cache.read(uid).await {
            Ok(cached) => cached,
            Err(err) => {
                warn!(%uid, error = %err, "ignoring unreadable progress cache");
                None
            }
        };

        match self.remote.get_progress(uid).await {
            Ok(Some(book)) => {
                if cached.as_ref() != Some(&book) {
                    debug!(%uid, "refreshing progress cache from remote");
                    self.write_cache(uid, &book).await;
                }
                Ok(LoadedProgress {
                    book,
                    source: ProgressSource::Remote,
                })
            }
            Ok(None) => match cached {
                Some(book) if !book.is_empty() => {
                    info!(%uid, courses = book.len(), "seeding remote progress from local cache");
                    for progress in book.iter() {
                        if let Err(err) = self.remote.upsert_course_progress(uid, progress).await {
                            warn!(%uid, course = %progress.course_id(), error = %err, "could not push cached progress");
                            break;
                        }
                    }
                    Ok(LoadedProgress {
                        book,
                        source: ProgressSource::LocalHint,
                    })
                }
                _ => Ok(LoadedProgress {
                    book: ProgressBook::new(),
                    source: ProgressSource::Empty,
                }),
            },
            Err(err) => match cached {
                Some(book) => {
                    warn!(%uid, error = %err, "remote progress unavailable, using local cache");
                    Ok(LoadedProgress {
                        book,
                        source: ProgressSource::LocalFallback,
                    })
                }
                None => Err(err.into()),
            },
        }
    }

    /// Persist one course's record from `book`, remote first, then the cache.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::MissingCourse` if `book` has no record for
    /// `course`. Returns `ProgressError::Storage` if the remote write fails;
    /// the cache is not touched in that case.
    pub async fn record(
        &self,
        uid: &UserId,
        book: &ProgressBook,
        course: &CourseId,
    ) -> Result<(), ProgressError> {
        let progress = book
            .get(course)
            .ok_or_else(|| ProgressError::MissingCourse(course.clone()))?;
        self.remote.upsert_course_progress(uid, progress).await?;
        self.write_cache(uid, book).await;
        Ok(())
    }

    async fn write_cache(&self, uid: &UserId, book: &ProgressBook) {
        if let Err(err) = self.cache.write(uid, book).await {
            warn!(%uid, error = %err, "progress cache write failed");
        }
    }
}
