use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use learn_core::model::{ProgressBook, UserId};
use tracing::debug;

use crate::repository::{ProgressCache, StorageError, progress_cache_key, ser};

/// Progress cache that keeps one JSON file per user under a directory.
///
/// Files are named `<key>.json` where the key comes from
/// [`progress_cache_key`]. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct JsonFileProgressCache {
    dir: PathBuf,
}

impl JsonFileProgressCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for a user.
    #[must_use]
    pub fn path_for(&self, uid: &UserId) -> PathBuf {
        self.dir.join(format!("{}.json", progress_cache_key(uid)))
    }
}

fn io_err(e: std::io::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressCache for JsonFileProgressCache {
    async fn read(&self, uid: &UserId) -> Result<Option<ProgressBook>, StorageError> {
        let path = self.path_for(uid);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        };
        serde_json::from_str(&raw).map(Some).map_err(ser)
    }

    async fn write(&self, uid: &UserId, book: &ProgressBook) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(book).map_err(ser)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        // Write to a sibling file and rename so readers never see a partial document.
        let path = self.path_for(uid);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        debug!(path = %path.display(), courses = book.len(), "progress cache written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::model::{CourseId, LessonId};
    use learn_core::progression::complete_lesson;
    use learn_core::time::fixed_now;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileProgressCache::new(dir.path());
        let uid = UserId::new("u1").unwrap();
        assert!(cache.read(&uid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_and_reads_back_book() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileProgressCache::new(dir.path().join("nested"));
        let uid = UserId::new("u1").unwrap();

        let mut book = ProgressBook::new();
        let progress = book.entry(&CourseId::new("arduino-basics").unwrap(), fixed_now());
        complete_lesson(
            progress,
            &LessonId::new("setup-loop").unwrap(),
            50,
            fixed_now(),
        );

        cache.write(&uid, &book).await.unwrap();
        assert!(cache.path_for(&uid).ends_with("progress_u1.json"));
        assert_eq!(cache.read(&uid).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileProgressCache::new(dir.path());
        let uid = UserId::new("u1").unwrap();
        std::fs::write(cache.path_for(&uid), "[1, 2").unwrap();

        let err = cache.read(&uid).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
