use learn_core::model::{User, UserId};

use super::SqliteRepository;
use super::mapping::{map_user_row, to_json, u64_to_i64};
use crate::repository::{StorageError, UserRecord, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, uid: &UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT uid, email, display_name, photo_url, level, xp, total_xp,
                   completed_courses, badges, joined_at
            FROM users WHERE uid = ?1
            ",
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_user_row(&row)?.into_user().map(Some),
            None => Ok(None),
        }
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let record = UserRecord::from_user(user);

        // `joined_at` is kept from the first write.
        sqlx::query(
            r"
            INSERT INTO users (uid, email, display_name, photo_url, level, xp, total_xp,
                               completed_courses, badges, joined_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(uid) DO UPDATE SET
                email = excluded.email,
                display_name = excluded.display_name,
                photo_url = excluded.photo_url,
                level = excluded.level,
                xp = excluded.xp,
                total_xp = excluded.total_xp,
                completed_courses = excluded.completed_courses,
                badges = excluded.badges
            ",
        )
        .bind(&record.uid)
        .bind(&record.email)
        .bind(&record.display_name)
        .bind(&record.photo_url)
        .bind(i64::from(record.level))
        .bind(i64::from(record.xp))
        .bind(u64_to_i64("total_xp", record.total_xp)?)
        .bind(to_json(&record.completed_courses)?)
        .bind(to_json(&record.badges)?)
        .bind(record.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT uid, email, display_name, photo_url, level, xp, total_xp,
                   completed_courses, badges, joined_at
            FROM users
            ORDER BY total_xp DESC, display_name ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(map_user_row(&row)?.into_user()?);
        }
        Ok(users)
    }
}
