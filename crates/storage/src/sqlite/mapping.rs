use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use learn_core::model::{Badge, CourseId, LessonId, UserProgress};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{StorageError, UserRecord, ser};

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range")))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

fn from_json<T: DeserializeOwned>(field: &'static str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("{field}: {e}")))
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<UserRecord, StorageError> {
    let completed_courses: Vec<String> = from_json(
        "completed_courses",
        &row.try_get::<String, _>("completed_courses").map_err(ser)?,
    )?;
    let badges: Vec<Badge> = from_json("badges", &row.try_get::<String, _>("badges").map_err(ser)?)?;

    Ok(UserRecord {
        uid: row.try_get("uid").map_err(ser)?,
        email: row.try_get("email").map_err(ser)?,
        display_name: row.try_get("display_name").map_err(ser)?,
        photo_url: row.try_get("photo_url").map_err(ser)?,
        level: i64_to_u32("level", row.try_get("level").map_err(ser)?)?,
        xp: i64_to_u32("xp", row.try_get("xp").map_err(ser)?)?,
        total_xp: i64_to_u64("total_xp", row.try_get("total_xp").map_err(ser)?)?,
        completed_courses,
        badges,
        joined_at: row.try_get("joined_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<UserProgress, StorageError> {
    let course_id =
        CourseId::new(row.try_get::<String, _>("course_id").map_err(ser)?).map_err(ser)?;
    let lessons: Vec<String> = from_json(
        "completed_lessons",
        &row.try_get::<String, _>("completed_lessons").map_err(ser)?,
    )?;
    let completed_lessons = lessons
        .into_iter()
        .map(LessonId::new)
        .collect::<Result<BTreeSet<_>, _>>()
        .map_err(ser)?;

    let last_accessed: DateTime<Utc> = row.try_get("last_accessed").map_err(ser)?;
    // Rows written before version 2 have no start time.
    let started_at: Option<DateTime<Utc>> = row.try_get("started_at").map_err(ser)?;
    let active_days: BTreeSet<NaiveDate> = from_json(
        "active_days",
        &row.try_get::<String, _>("active_days").map_err(ser)?,
    )?;

    Ok(UserProgress::from_persisted(
        course_id,
        completed_lessons,
        i64_to_u64("score", row.try_get("score").map_err(ser)?)?,
        started_at.unwrap_or(last_accessed),
        last_accessed,
        active_days,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_totals_are_rejected() {
        assert!(i64_to_u64("total_xp", -1).is_err());
        assert_eq!(i64_to_u64("total_xp", 42).unwrap(), 42);
    }

    #[test]
    fn oversized_totals_are_rejected() {
        assert!(u64_to_i64("total_xp", u64::MAX).is_err());
    }

    #[test]
    fn json_errors_name_the_field() {
        let err = from_json::<Vec<String>>("badges", "nope").unwrap_err();
        assert!(err.to_string().contains("badges"));
    }
}
