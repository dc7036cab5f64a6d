use std::sync::Arc;

use learn_core::catalog::Catalog;
use learn_core::model::{CourseId, Difficulty};
use learn_core::progression::{
    XP_PER_LEVEL, course_progress_percent, is_course_complete, learning_streak, resume_index,
    xp_to_next_level,
};

use crate::Clock;
use crate::learning::LearnerSession;

/// One course as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCard {
    pub id: CourseId,
    pub title: String,
    pub difficulty: Difficulty,
    pub lesson_count: usize,
    pub percent: u8,
    pub completed: bool,
    /// Title of the lesson the learner would resume at.
    pub next_lesson: String,
}

/// Profile summary plus per-course progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub first_name: String,
    pub level: u32,
    pub total_xp: u64,
    pub xp_into_level: u32,
    pub xp_to_next_level: u32,
    /// Whole percent of the way to the next level.
    pub level_percent: u8,
    pub completed_courses: usize,
    pub badges: usize,
    pub days_active: u64,
    /// Consecutive days with a completed lesson, still running if the last
    /// one was yesterday.
    pub streak_days: u32,
    pub courses: Vec<CourseCard>,
}

/// Builds dashboard views from a learner session.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    catalog: Arc<Catalog>,
}

impl DashboardService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>) -> Self {
        Self { clock, catalog }
    }

    #[must_use]
    pub fn dashboard(&self, session: &LearnerSession) -> Dashboard {
        let user = session.user();
        let progress = session.progress();

        let courses = self
            .catalog
            .courses()
            .iter()
            .map(|course| {
                let record = progress.get(course.id());
                let next_lesson = course
                    .lessons()
                    .get(resume_index(course, record))
                    .map(|l| l.title().to_owned())
                    .unwrap_or_default();
                CourseCard {
                    id: course.id().clone(),
                    title: course.title().to_owned(),
                    difficulty: course.difficulty(),
                    lesson_count: course.lessons().len(),
                    percent: course_progress_percent(course, record),
                    completed: is_course_complete(course, record),
                    next_lesson,
                }
            })
            .collect();

        let level_percent = u64::from(user.xp()) * 100 / XP_PER_LEVEL;
        let now = self.clock.now();

        Dashboard {
            first_name: user.identity().first_name().to_owned(),
            level: user.level(),
            total_xp: user.total_xp(),
            xp_into_level: user.xp(),
            xp_to_next_level: xp_to_next_level(user.total_xp()),
            level_percent: u8::try_from(level_percent).unwrap_or(100),
            completed_courses: user.completed_courses().len(),
            badges: user.badges().len(),
            days_active: user.days_active(now),
            streak_days: learning_streak(progress, now.date_naive()),
            courses,
        }
    }
}
