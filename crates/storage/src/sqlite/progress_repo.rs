use learn_core::model::{ProgressBook, UserId, UserProgress};

use super::SqliteRepository;
use super::mapping::{map_progress_row, to_json, u64_to_i64};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, uid: &UserId) -> Result<Option<ProgressBook>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT course_id, completed_lessons, score, started_at, last_accessed, active_days
            FROM course_progress
            WHERE uid = ?1
            ORDER BY course_id ASC
            ",
        )
        .bind(uid.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut book = ProgressBook::new();
        for row in rows {
            book.insert(map_progress_row(&row)?);
        }
        Ok(Some(book))
    }

    async fn upsert_course_progress(
        &self,
        uid: &UserId,
        progress: &UserProgress,
    ) -> Result<(), StorageError> {
        let lessons: Vec<&str> = progress
            .completed_lessons()
            .iter()
            .map(|l| l.as_str())
            .collect();

        sqlx::query(
            r"
            INSERT INTO course_progress (
                uid, course_id, completed_lessons, score, started_at, last_accessed, active_days
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(uid, course_id) DO UPDATE SET
                completed_lessons = excluded.completed_lessons,
                score = excluded.score,
                started_at = excluded.started_at,
                last_accessed = excluded.last_accessed,
                active_days = excluded.active_days
            ",
        )
        .bind(uid.as_str())
        .bind(progress.course_id().as_str())
        .bind(to_json(&lessons)?)
        .bind(u64_to_i64("score", progress.score())?)
        .bind(progress.started_at())
        .bind(progress.last_accessed())
        .bind(to_json(progress.active_days())?)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
