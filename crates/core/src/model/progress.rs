use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, LessonId};

/// A learner's completion record for one course.
///
/// Created on first interaction with a course and never deleted. Lessons
/// only ever move from incomplete to complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    course_id: CourseId,
    completed_lessons: BTreeSet<LessonId>,
    score: u64,
    #[serde(default)]
    started_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    /// UTC days on which a lesson of this course was completed.
    #[serde(default)]
    active_days: BTreeSet<NaiveDate>,
}

impl UserProgress {
    #[must_use]
    pub fn new(course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            course_id,
            completed_lessons: BTreeSet::new(),
            score: 0,
            started_at: now,
            last_accessed: now,
            active_days: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn from_persisted(
        course_id: CourseId,
        completed_lessons: BTreeSet<LessonId>,
        score: u64,
        started_at: DateTime<Utc>,
        last_accessed: DateTime<Utc>,
        active_days: BTreeSet<NaiveDate>,
    ) -> Self {
        Self {
            course_id,
            completed_lessons,
            score,
            started_at,
            last_accessed,
            active_days,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &BTreeSet<LessonId> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// When the learner first opened the course.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    #[must_use]
    pub fn active_days(&self) -> &BTreeSet<NaiveDate> {
        &self.active_days
    }

    pub(crate) fn insert_lesson(&mut self, lesson: LessonId) -> bool {
        self.completed_lessons.insert(lesson)
    }

    pub(crate) fn add_score(&mut self, delta: u64) {
        self.score = self.score.saturating_add(delta);
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.last_accessed = at;
        self.active_days.insert(at.date_naive());
    }
}

/// Every course record for one learner, keyed by course id.
///
/// This is the value stored under the local cache key `progress_{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressBook {
    courses: BTreeMap<CourseId, UserProgress>,
}

impl ProgressBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, course: &CourseId) -> Option<&UserProgress> {
        self.courses.get(course)
    }

    /// The record for `course`, created on first access.
    pub fn entry(&mut self, course: &CourseId, now: DateTime<Utc>) -> &mut UserProgress {
        self.courses
            .entry(course.clone())
            .or_insert_with(|| UserProgress::new(course.clone(), now))
    }

    /// Insert or replace a whole course record.
    pub fn insert(&mut self, progress: UserProgress) {
        self.courses.insert(progress.course_id.clone(), progress);
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserProgress> {
        self.courses.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Lesson completions summed over every course.
    #[must_use]
    pub fn completed_lesson_count(&self) -> usize {
        self.courses.values().map(|p| p.completed_lessons.len()).sum()
    }

    /// Days with any completion, across every course.
    #[must_use]
    pub fn active_days(&self) -> BTreeSet<NaiveDate> {
        self.courses
            .values()
            .flat_map(|p| p.active_days.iter().copied())
            .collect()
    }
}

impl FromIterator<UserProgress> for ProgressBook {
    fn from_iter<T: IntoIterator<Item = UserProgress>>(iter: T) -> Self {
        let mut book = Self::new();
        for progress in iter {
            book.insert(progress);
        }
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn cid(id: &str) -> CourseId {
        CourseId::new(id).unwrap()
    }

    #[test]
    fn entry_creates_record_once() {
        let mut book = ProgressBook::new();
        let course = cid("arduino-basics");
        book.entry(&course, fixed_now())
            .insert_lesson(LessonId::new("setup-loop").unwrap());
        book.entry(&course, fixed_now());
        assert_eq!(book.len(), 1);
        assert_eq!(book.completed_lesson_count(), 1);
    }

    #[test]
    fn book_serializes_as_course_map() {
        let mut book = ProgressBook::new();
        book.entry(&cid("communication"), fixed_now());
        let json = serde_json::to_value(&book).unwrap();
        assert!(json["communication"]["completedLessons"].is_array());
        assert!(json["communication"]["lastAccessed"].is_string());
        assert!(json["communication"]["startedAt"].is_string());
        let back: ProgressBook = serde_json::from_value(json).unwrap();
        assert_eq!(back, book);
    }

    #[test]
    fn cached_records_without_activity_still_parse() {
        let json = serde_json::json!({
            "communication": {
                "courseId": "communication",
                "completedLessons": ["serial-basics"],
                "score": 0,
                "lastAccessed": "2025-01-01T12:00:00Z"
            }
        });
        let book: ProgressBook = serde_json::from_value(json).unwrap();
        let record = book.get(&cid("communication")).unwrap();
        assert!(record.active_days().is_empty());
        assert_eq!(record.completed_lessons().len(), 1);
    }

    #[test]
    fn activity_days_merge_across_courses() {
        let mut book = ProgressBook::new();
        let day_two = fixed_now() + chrono::Duration::days(1);
        book.entry(&cid("arduino-basics"), fixed_now()).touch(fixed_now());
        book.entry(&cid("communication"), day_two).touch(day_two);
        book.entry(&cid("communication"), day_two).touch(day_two);
        assert_eq!(book.active_days().len(), 2);
        assert_eq!(
            book.get(&cid("communication")).unwrap().started_at(),
            day_two
        );
    }
}
