use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ids::{CourseId, LessonId};
use crate::model::lesson::Lesson;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course has no lessons")]
    NoLessons,

    #[error("duplicate lesson id in course: {0}")]
    DuplicateLesson(String),

    #[error("course cannot list itself as a prerequisite")]
    SelfPrerequisite,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = CourseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(CourseError::UnknownDifficulty(other.to_string())),
        }
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Unvalidated course fields, as authored in the catalogue.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub category: String,
    pub xp_reward: u32,
    pub prerequisites: Vec<CourseId>,
    pub lessons: Vec<Lesson>,
}

impl CourseDraft {
    /// Validate the draft into an immutable course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the title is blank, there are no lessons,
    /// a lesson id repeats, or the course requires itself.
    pub fn validate(self) -> Result<Course, CourseError> {
        if self.title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        if self.lessons.is_empty() {
            return Err(CourseError::NoLessons);
        }
        let mut seen = HashSet::with_capacity(self.lessons.len());
        for lesson in &self.lessons {
            if !seen.insert(lesson.id()) {
                return Err(CourseError::DuplicateLesson(lesson.id().to_string()));
            }
        }
        if self.prerequisites.contains(&self.id) {
            return Err(CourseError::SelfPrerequisite);
        }

        Ok(Course {
            id: self.id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            estimated_time: self.estimated_time,
            category: self.category,
            xp_reward: self.xp_reward,
            prerequisites: self.prerequisites,
            lessons: self.lessons,
        })
    }
}

/// A course: an ordered sequence of lessons.
///
/// `xp_reward` is the advertised total shown on course cards. It is not
/// enforced as the sum of lesson rewards and is never awarded directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    difficulty: Difficulty,
    estimated_time: String,
    category: String,
    xp_reward: u32,
    prerequisites: Vec<CourseId>,
    lessons: Vec<Lesson>,
}

impl Course {
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn estimated_time(&self) -> &str {
        &self.estimated_time
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn xp_reward(&self) -> u32 {
        self.xp_reward
    }

    #[must_use]
    pub fn prerequisites(&self) -> &[CourseId] {
        &self.prerequisites
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }

    #[must_use]
    pub fn lesson_index(&self, id: &LessonId) -> Option<usize> {
        self.lessons.iter().position(|l| l.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lesson::LessonKind;

    fn theory(id: &str) -> Lesson {
        Lesson::new(LessonId::new(id).unwrap(), id, "", 50, LessonKind::Theory).unwrap()
    }

    fn draft(lessons: Vec<Lesson>) -> CourseDraft {
        CourseDraft {
            id: CourseId::new("arduino-basics").unwrap(),
            title: "Arduino Fundamentals".into(),
            description: String::new(),
            difficulty: Difficulty::Beginner,
            estimated_time: "2 hours".into(),
            category: "Programming".into(),
            xp_reward: 500,
            prerequisites: vec![],
            lessons,
        }
    }

    #[test]
    fn validate_rejects_empty_course() {
        assert_eq!(draft(vec![]).validate().unwrap_err(), CourseError::NoLessons);
    }

    #[test]
    fn validate_rejects_duplicate_lessons() {
        let err = draft(vec![theory("a"), theory("a")]).validate().unwrap_err();
        assert_eq!(err, CourseError::DuplicateLesson("a".into()));
    }

    #[test]
    fn validate_rejects_self_prerequisite() {
        let mut d = draft(vec![theory("a")]);
        d.prerequisites.push(d.id.clone());
        assert_eq!(d.validate().unwrap_err(), CourseError::SelfPrerequisite);
    }

    #[test]
    fn lookups_find_lessons() {
        let course = draft(vec![theory("a"), theory("b")]).validate().unwrap();
        let b = LessonId::new("b").unwrap();
        assert_eq!(course.lesson_index(&b), Some(1));
        assert_eq!(course.lesson(&b).map(Lesson::title), Some("b"));
        assert!(course.lesson(&LessonId::new("zzz").unwrap()).is_none());
    }

    #[test]
    fn difficulty_round_trips_through_str() {
        for d in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Advanced,
        ] {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert!("expert".parse::<Difficulty>().is_err());
    }
}
