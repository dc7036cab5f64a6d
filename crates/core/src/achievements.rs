//! Badges unlocked by learning milestones.

use chrono::{DateTime, Duration, Utc};

use crate::catalog::Catalog;
use crate::grading::QuizGrade;
use crate::model::{Badge, BadgeId, ProgressBook, User};
use crate::progression::{is_course_complete, learning_streak};

/// Consecutive active days needed for *Dedicated Student*.
pub const DEDICATED_STREAK_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    FirstSteps,
    CodeWarrior,
    QuizMaster,
    SpeedLearner,
    DedicatedStudent,
    ArduinoExpert,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstSteps,
        Achievement::CodeWarrior,
        Achievement::QuizMaster,
        Achievement::SpeedLearner,
        Achievement::DedicatedStudent,
        Achievement::ArduinoExpert,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "first-steps",
            Achievement::CodeWarrior => "code-warrior",
            Achievement::QuizMaster => "quiz-master",
            Achievement::SpeedLearner => "speed-learner",
            Achievement::DedicatedStudent => "dedicated-student",
            Achievement::ArduinoExpert => "arduino-expert",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "First Steps",
            Achievement::CodeWarrior => "Code Warrior",
            Achievement::QuizMaster => "Quiz Master",
            Achievement::SpeedLearner => "Speed Learner",
            Achievement::DedicatedStudent => "Dedicated Student",
            Achievement::ArduinoExpert => "Arduino Expert",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "Completed your first lesson",
            Achievement::CodeWarrior => "Wrote your first Arduino program",
            Achievement::QuizMaster => "Scored 100% on a quiz",
            Achievement::SpeedLearner => "Completed a course in one day",
            Achievement::DedicatedStudent => "7-day learning streak",
            Achievement::ArduinoExpert => "Completed all courses",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "🎯",
            Achievement::CodeWarrior => "⚔️",
            Achievement::QuizMaster => "🧠",
            Achievement::SpeedLearner => "⚡",
            Achievement::DedicatedStudent => "🔥",
            Achievement::ArduinoExpert => "🏆",
        }
    }

    #[must_use]
    pub fn badge_id(self) -> BadgeId {
        BadgeId::new(self.slug()).unwrap_or_else(|_| unreachable!("badge slugs are non-empty"))
    }

    #[must_use]
    pub fn badge(self, unlocked_at: DateTime<Utc>) -> Badge {
        Badge {
            id: self.badge_id(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            icon: self.icon().to_string(),
            unlocked_at,
        }
    }
}

/// What just happened, as far as badge rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    LessonCompleted,
    CodePassed,
    QuizGraded(QuizGrade),
}

/// Achievements earned by `milestone` that `user` does not hold yet.
///
/// `progress` must already include the completion being celebrated.
#[must_use]
pub fn newly_unlocked(
    user: &User,
    progress: &ProgressBook,
    catalog: &Catalog,
    milestone: Milestone,
) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| !user.has_badge(&a.badge_id()))
        .filter(|a| match a {
            Achievement::FirstSteps => progress.completed_lesson_count() >= 1,
            Achievement::CodeWarrior => matches!(milestone, Milestone::CodePassed),
            Achievement::QuizMaster => {
                matches!(milestone, Milestone::QuizGraded(grade) if grade.is_perfect())
            }
            Achievement::SpeedLearner => catalog.courses().iter().any(|c| {
                progress.get(c.id()).is_some_and(|p| {
                    is_course_complete(c, Some(p))
                        && p.last_accessed() - p.started_at() <= Duration::days(1)
                })
            }),
            Achievement::DedicatedStudent => progress
                .active_days()
                .last()
                .is_some_and(|day| learning_streak(progress, *day) >= DEDICATED_STREAK_DAYS),
            Achievement::ArduinoExpert => {
                !catalog.is_empty()
                    && catalog
                        .courses()
                        .iter()
                        .all(|c| is_course_complete(c, progress.get(c.id())))
            }
        })
        .collect()
}
