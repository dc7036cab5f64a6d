use async_trait::async_trait;
use chrono::{DateTime, Utc};
use learn_core::model::{
    Badge, CourseId, Identity, ProgressBook, User, UserId, UserProgress,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a user document.
///
/// `level` and `xp` are written for readers that sort or display without
/// loading the domain type; they are recomputed from `total_xp` on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub level: u32,
    pub xp: u32,
    pub total_xp: u64,
    pub completed_courses: Vec<String>,
    pub badges: Vec<Badge>,
    pub joined_at: DateTime<Utc>,
}

impl UserRecord {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        let identity = user.identity();
        Self {
            uid: identity.uid().to_string(),
            email: identity.email().to_owned(),
            display_name: identity.display_name().to_owned(),
            photo_url: identity.photo_url().map(ToString::to_string),
            level: user.level(),
            xp: user.xp(),
            total_xp: user.total_xp(),
            completed_courses: user
                .completed_courses()
                .iter()
                .map(ToString::to_string)
                .collect(),
            badges: user.badges().to_vec(),
            joined_at: user.joined_at(),
        }
    }

    /// Convert the record back into a domain `User`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if ids or identity fields fail
    /// validation.
    pub fn into_user(self) -> Result<User, StorageError> {
        let uid = UserId::new(self.uid).map_err(ser)?;
        let identity = Identity::new(
            uid,
            self.email,
            self.display_name,
            self.photo_url.as_deref(),
        )
        .map_err(ser)?;
        let completed_courses = self
            .completed_courses
            .into_iter()
            .map(CourseId::new)
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(ser)?;

        Ok(User::from_persisted(
            identity,
            self.total_xp,
            completed_courses,
            self.badges,
            self.joined_at,
        ))
    }
}

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Document store for user profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by uid.
    ///
    /// Returns `Ok(None)` when no document exists yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_user(&self, uid: &UserId) -> Result<Option<User>, StorageError>;

    /// Create or overwrite the user's document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Users ordered by total XP, highest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError>;
}

/// Remote, authoritative per-course progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch every course record for a user.
    ///
    /// Returns `Ok(None)` when the user has never recorded progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_progress(&self, uid: &UserId) -> Result<Option<ProgressBook>, StorageError>;

    /// Create or overwrite one course record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_course_progress(
        &self,
        uid: &UserId,
        progress: &UserProgress,
    ) -> Result<(), StorageError>;
}

/// Local, best-effort copy of a user's progress book.
#[async_trait]
pub trait ProgressCache: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the cached entry exists but cannot be read.
    async fn read(&self, uid: &UserId) -> Result<Option<ProgressBook>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be written.
    async fn write(&self, uid: &UserId, book: &ProgressBook) -> Result<(), StorageError>;
}

/// Cache key for a user's progress book.
#[must_use]
pub fn progress_cache_key(uid: &UserId) -> String {
    format!("progress_{uid}")
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<HashMap<UserId, UserRecord>>>,
    progress: Arc<Mutex<HashMap<UserId, ProgressBook>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, uid: &UserId) -> Result<Option<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(uid).cloned().map(UserRecord::into_user).transpose()
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user.uid().clone(), UserRecord::from_user(user));
        Ok(())
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<&UserRecord> = guard.values().collect();
        records.sort_by(|a, b| {
            b.total_xp
                .cmp(&a.total_xp)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        records
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .map(UserRecord::into_user)
            .collect()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, uid: &UserId) -> Result<Option<ProgressBook>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(uid).cloned())
    }

    async fn upsert_course_progress(
        &self,
        uid: &UserId,
        progress: &UserProgress,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(uid.clone())
            .or_default()
            .insert(progress.clone());
        Ok(())
    }
}

/// In-memory progress cache holding serialized JSON, like browser storage.
#[derive(Clone, Default)]
pub struct InMemoryProgressCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryProgressCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw cached JSON for a key, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Store raw JSON under a key, bypassing serialization.
    pub fn put_raw(&self, key: impl Into<String>, json: impl Into<String>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert(key.into(), json.into());
        }
    }
}

#[async_trait]
impl ProgressCache for InMemoryProgressCache {
    async fn read(&self, uid: &UserId) -> Result<Option<ProgressBook>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(&progress_cache_key(uid))
            .map(|json| serde_json::from_str(json).map_err(ser))
            .transpose()
    }

    async fn write(&self, uid: &UserId, book: &ProgressBook) -> Result<(), StorageError> {
        let json = serde_json::to_string(book).map_err(ser)?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(progress_cache_key(uid), json);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub cache: Arc<dyn ProgressCache>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        let cache: Arc<dyn ProgressCache> = Arc::new(InMemoryProgressCache::new());
        Self {
            users,
            progress,
            cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::achievements::Achievement;
    use learn_core::model::LessonId;
    use learn_core::progression::{award_xp, complete_lesson};
    use learn_core::time::fixed_now;

    fn user(uid: &str, name: &str, total_xp: u64) -> User {
        let identity = Identity::new(
            UserId::new(uid).unwrap(),
            format!("{uid}@example.com"),
            name,
            Some("https://example.com/avatar.png"),
        )
        .unwrap();
        let fresh = User::new(identity, fixed_now());
        award_xp(&fresh, total_xp).user
    }

    #[tokio::test]
    async fn round_trips_user_document() {
        let repo = InMemoryRepository::new();
        let mut stored = user("u1", "Ada", 2_350);
        stored.mark_course_completed(CourseId::new("arduino-basics").unwrap());
        stored.unlock_badge(Achievement::FirstSteps.badge(fixed_now()));
        repo.upsert_user(&stored).await.unwrap();

        let fetched = repo.get_user(stored.uid()).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(fetched.level(), 3);
        assert!(repo
            .get_user(&UserId::new("nobody").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn lists_users_by_total_xp() {
        let repo = InMemoryRepository::new();
        for (uid, name, xp) in [("a", "Low", 100), ("b", "High", 9_000), ("c", "Mid", 4_000)] {
            repo.upsert_user(&user(uid, name, xp)).await.unwrap();
        }
        let top = repo.list_users(2).await.unwrap();
        let names: Vec<_> = top.iter().map(|u| u.identity().display_name()).collect();
        assert_eq!(names, ["High", "Mid"]);
    }

    #[tokio::test]
    async fn record_serializes_in_camel_case() {
        let record = UserRecord::from_user(&user("u1", "Ada", 1_250));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalXp"], 1_250);
        assert_eq!(json["level"], 2);
        assert_eq!(json["xp"], 250);
        assert_eq!(json["displayName"], "Ada");
    }

    #[tokio::test]
    async fn stale_level_is_recomputed_on_load() {
        let mut record = UserRecord::from_user(&user("u1", "Ada", 3_100));
        record.level = 1;
        record.xp = 0;
        let loaded = record.into_user().unwrap();
        assert_eq!(loaded.level(), 4);
        assert_eq!(loaded.xp(), 100);
    }

    #[tokio::test]
    async fn course_progress_upserts_per_course() {
        let repo = InMemoryRepository::new();
        let uid = UserId::new("u1").unwrap();
        assert!(repo.get_progress(&uid).await.unwrap().is_none());

        let course = CourseId::new("arduino-basics").unwrap();
        let mut progress = UserProgress::new(course.clone(), fixed_now());
        complete_lesson(
            &mut progress,
            &LessonId::new("setup-loop").unwrap(),
            0,
            fixed_now(),
        );
        repo.upsert_course_progress(&uid, &progress).await.unwrap();

        let book = repo.get_progress(&uid).await.unwrap().unwrap();
        assert_eq!(book.get(&course), Some(&progress));
    }

    #[tokio::test]
    async fn cache_stores_json_under_progress_key() {
        let cache = InMemoryProgressCache::new();
        let uid = UserId::new("u1").unwrap();
        let mut book = ProgressBook::new();
        book.entry(&CourseId::new("communication").unwrap(), fixed_now());

        cache.write(&uid, &book).await.unwrap();
        assert!(cache.raw("progress_u1").is_some());
        assert_eq!(cache.read(&uid).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn corrupt_cache_entry_is_an_error() {
        let cache = InMemoryProgressCache::new();
        cache.put_raw("progress_u1", "{not json");
        let err = cache.read(&UserId::new("u1").unwrap()).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
