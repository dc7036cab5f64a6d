//! The course catalogue: an immutable list of courses loaded once per process.

mod builtin;

use thiserror::Error;

use crate::model::{
    Course, CourseError, CourseId, Lesson, LessonError, LessonId, QuizQuestionError,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Question(#[from] QuizQuestionError),
    #[error("invalid catalogue id: {0}")]
    InvalidId(String),
    #[error("duplicate course id: {0}")]
    DuplicateCourse(String),
    #[error("course {course} requires unknown course {prerequisite}")]
    UnknownPrerequisite { course: String, prerequisite: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Build a catalogue from validated courses.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if two courses share an id or a prerequisite
    /// names a course that is not in the catalogue.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        for (idx, course) in courses.iter().enumerate() {
            if courses[..idx].iter().any(|c| c.id() == course.id()) {
                return Err(CatalogError::DuplicateCourse(course.id().to_string()));
            }
        }
        for course in &courses {
            for prerequisite in course.prerequisites() {
                if !courses.iter().any(|c| c.id() == prerequisite) {
                    return Err(CatalogError::UnknownPrerequisite {
                        course: course.id().to_string(),
                        prerequisite: prerequisite.to_string(),
                    });
                }
            }
        }
        Ok(Self { courses })
    }

    /// The shipped Arduino curriculum.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` only if the built-in content is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin::courses()?)
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn lesson(&self, course: &CourseId, lesson: &LessonId) -> Option<(&Course, &Lesson)> {
        let course = self.course(course)?;
        let lesson = course.lesson(lesson)?;
        Some((course, lesson))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseDraft, Difficulty, LessonKind};

    fn course(id: &str, prerequisites: &[&str]) -> Course {
        CourseDraft {
            id: CourseId::new(id).unwrap(),
            title: id.into(),
            description: String::new(),
            difficulty: Difficulty::Beginner,
            estimated_time: String::new(),
            category: String::new(),
            xp_reward: 0,
            prerequisites: prerequisites
                .iter()
                .map(|p| CourseId::new(*p).unwrap())
                .collect(),
            lessons: vec![
                Lesson::new(LessonId::new("l1").unwrap(), "L1", "", 10, LessonKind::Theory)
                    .unwrap(),
            ],
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);

        let basics = catalog
            .course(&CourseId::new("arduino-basics").unwrap())
            .unwrap();
        assert_eq!(basics.lessons().len(), 4);
        assert_eq!(basics.xp_reward(), 500);
        assert_eq!(basics.difficulty(), Difficulty::Beginner);

        let (_, blink) = catalog
            .lesson(
                &CourseId::new("arduino-basics").unwrap(),
                &LessonId::new("blink-practice").unwrap(),
            )
            .unwrap();
        assert_eq!(
            blink.required_tokens().unwrap(),
            ["pinMode", "digitalWrite", "delay"]
        );

        let (_, quiz) = catalog
            .lesson(
                &CourseId::new("arduino-basics").unwrap(),
                &LessonId::new("digital-quiz").unwrap(),
            )
            .unwrap();
        assert_eq!(quiz.quiz().unwrap().len(), 3);
    }

    #[test]
    fn builtin_theory_content_is_markdown() {
        let catalog = Catalog::builtin().unwrap();
        let (_, lesson) = catalog
            .lesson(
                &CourseId::new("communication").unwrap(),
                &LessonId::new("serial-communication").unwrap(),
            )
            .unwrap();
        assert!(lesson.content().starts_with("# Serial Communication"));
        assert_eq!(lesson.kind(), &LessonKind::Theory);
    }

    #[test]
    fn duplicate_courses_are_rejected() {
        let err = Catalog::new(vec![course("a", &[]), course("a", &[])]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateCourse("a".into()));
    }

    #[test]
    fn unknown_prerequisites_are_rejected() {
        let err = Catalog::new(vec![course("b", &["missing"])]).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownPrerequisite { .. }));
        assert!(Catalog::new(vec![course("a", &[]), course("b", &["a"])]).is_ok());
    }
}
