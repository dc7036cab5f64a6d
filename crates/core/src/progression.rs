//! XP accrual, levels, and lesson completion.
//!
//! Every level spans a flat [`XP_PER_LEVEL`] points:
//! `level = floor(total_xp / 1000) + 1` and `xp = total_xp mod 1000`.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{Course, LessonId, ProgressBook, User, UserProgress};

/// XP needed to advance one level.
pub const XP_PER_LEVEL: u64 = 1_000;

/// Level reached with `total_xp` accumulated points (starting at 1).
#[must_use]
pub fn level_for(total_xp: u64) -> u32 {
    u32::try_from(total_xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Points earned inside the current level, always below [`XP_PER_LEVEL`].
#[must_use]
pub fn xp_into_level(total_xp: u64) -> u32 {
    // Remainder is < 1000, so it always fits.
    u32::try_from(total_xp % XP_PER_LEVEL).unwrap_or(0)
}

/// Points still missing before the next level.
#[must_use]
pub fn xp_to_next_level(total_xp: u64) -> u32 {
    u32::try_from(XP_PER_LEVEL - total_xp % XP_PER_LEVEL).unwrap_or(0)
}

//
// ─── XP AWARD ──────────────────────────────────────────────────────────────────
//

/// The user after an XP award, plus what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpAward {
    pub user: User,
    pub amount: u64,
    pub previous_level: u32,
    pub new_level: u32,
}

impl XpAward {
    /// True when the award pushed the user into a higher level.
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

/// Add `amount` XP to a copy of `user`.
///
/// The input is left untouched so a failed persist can keep the old value.
#[must_use]
pub fn award_xp(user: &User, amount: u64) -> XpAward {
    let previous_level = user.level();
    let mut updated = user.clone();
    updated.set_total_xp(user.total_xp().saturating_add(amount));
    let new_level = updated.level();

    XpAward {
        user: updated,
        amount,
        previous_level,
        new_level,
    }
}

//
// ─── LESSON COMPLETION ─────────────────────────────────────────────────────────
//

#[must_use]
pub fn is_lesson_complete(progress: &UserProgress, lesson: &LessonId) -> bool {
    progress.completed_lessons().contains(lesson)
}

/// Mark `lesson` complete, add `score_delta`, and stamp `last_accessed`.
///
/// The completed set is idempotent; the score is not. Callers check
/// [`is_lesson_complete`] first so XP and score are granted once.
///
/// Returns `true` if the lesson was not already complete.
pub fn complete_lesson(
    progress: &mut UserProgress,
    lesson: &LessonId,
    score_delta: u64,
    at: DateTime<Utc>,
) -> bool {
    let added = progress.insert_lesson(lesson.clone());
    progress.add_score(score_delta);
    progress.touch(at);
    added
}

/// Share of the course's lessons completed, rounded to a whole percent.
#[must_use]
pub fn course_progress_percent(course: &Course, progress: Option<&UserProgress>) -> u8 {
    let total = course.lessons().len();
    let Some(progress) = progress else {
        return 0;
    };
    if total == 0 {
        return 0;
    }
    let done = progress.completed_lessons().len().min(total);
    // Integer round-half-up of 100 * done / total.
    let pct = (done * 200 + total) / (total * 2);
    u8::try_from(pct.min(100)).unwrap_or(100)
}

/// True when every lesson of the course is complete.
#[must_use]
pub fn is_course_complete(course: &Course, progress: Option<&UserProgress>) -> bool {
    progress.is_some_and(|p| {
        course
            .lessons()
            .iter()
            .all(|lesson| is_lesson_complete(p, lesson.id()))
    })
}

/// Index of the lesson to open when the learner returns to a course.
///
/// The first incomplete lesson. A finished course reopens at its first lesson.
#[must_use]
pub fn resume_index(course: &Course, progress: Option<&UserProgress>) -> usize {
    let Some(progress) = progress else {
        return 0;
    };
    course
        .lessons()
        .iter()
        .position(|lesson| !is_lesson_complete(progress, lesson.id()))
        .unwrap_or(0)
}

//
// ─── STREAKS ───────────────────────────────────────────────────────────────────
//

/// Consecutive active days ending at `today`.
///
/// A streak whose last day is yesterday is still running; anything older
/// counts as zero.
#[must_use]
pub fn learning_streak(book: &ProgressBook, today: NaiveDate) -> u32 {
    consecutive_days(&book.active_days(), today)
}

fn consecutive_days(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 1;
    while let Some(prev) = cursor.pred_opt() {
        if !days.contains(&prev) {
            break;
        }
        streak += 1;
        cursor = prev;
    }
    streak
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{
        CourseDraft, CourseId, Difficulty, Identity, Lesson, LessonKind, UserId,
    };
    use crate::time::fixed_now;

    fn user_with(total_xp: u64) -> User {
        let identity =
            Identity::new(UserId::new("u1").unwrap(), "u1@example.com", "Learner", None).unwrap();
        User::from_persisted(identity, total_xp, BTreeSet::new(), vec![], fixed_now())
    }

    fn lid(id: &str) -> LessonId {
        LessonId::new(id).unwrap()
    }

    fn course(lessons: &[&str]) -> Course {
        CourseDraft {
            id: CourseId::new("c").unwrap(),
            title: "Course".into(),
            description: String::new(),
            difficulty: Difficulty::Beginner,
            estimated_time: String::new(),
            category: String::new(),
            xp_reward: 0,
            prerequisites: vec![],
            lessons: lessons
                .iter()
                .map(|id| Lesson::new(lid(id), *id, "", 10, LessonKind::Theory).unwrap())
                .collect(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn level_and_xp_follow_flat_thresholds() {
        for (total, level, xp) in [
            (0, 1, 0),
            (999, 1, 999),
            (1_000, 2, 0),
            (1_001, 2, 1),
            (14_250, 15, 250),
        ] {
            assert_eq!(level_for(total), level, "level for {total}");
            assert_eq!(xp_into_level(total), xp, "xp for {total}");
        }
        assert_eq!(xp_to_next_level(0), 1_000);
        assert_eq!(xp_to_next_level(1_750), 250);
    }

    #[test]
    fn xp_stays_below_threshold() {
        for total in (0..20_000).step_by(37) {
            assert!(u64::from(xp_into_level(total)) < XP_PER_LEVEL);
            assert_eq!(u64::from(level_for(total)), total / XP_PER_LEVEL + 1);
        }
    }

    #[test]
    fn level_for_saturates_on_huge_totals() {
        assert_eq!(level_for(u64::MAX), u32::MAX);
    }

    #[test]
    fn award_reports_level_up() {
        let award = award_xp(&user_with(950), 75);
        assert_eq!(award.user.total_xp(), 1_025);
        assert_eq!(award.user.level(), 2);
        assert_eq!(award.user.xp(), 25);
        assert_eq!(award.previous_level, 1);
        assert!(award.leveled_up());

        let quiet = award_xp(&user_with(100), 50);
        assert!(!quiet.leveled_up());
    }

    #[test]
    fn award_leaves_input_untouched() {
        let user = user_with(10);
        let _ = award_xp(&user, 500);
        assert_eq!(user.total_xp(), 10);
    }

    #[test]
    fn awards_compose_additively() {
        let base = user_with(420);
        for (a, b) in [(0, 0), (50, 75), (999, 1), (1_500, 2_250)] {
            let stepwise = award_xp(&award_xp(&base, a).user, b).user;
            let combined = award_xp(&base, a + b).user;
            assert_eq!(stepwise.total_xp(), combined.total_xp());
            assert_eq!(stepwise.level(), combined.level());
        }
    }

    #[test]
    fn award_saturates() {
        let award = award_xp(&user_with(u64::MAX - 1), 10);
        assert_eq!(award.user.total_xp(), u64::MAX);
    }

    #[test]
    fn complete_lesson_is_idempotent_for_the_set() {
        let mut progress = UserProgress::new(CourseId::new("c").unwrap(), fixed_now());
        let later = fixed_now() + chrono::Duration::minutes(5);

        assert!(complete_lesson(&mut progress, &lid("a"), 0, fixed_now()));
        let once = progress.completed_lessons().clone();
        assert!(!complete_lesson(&mut progress, &lid("a"), 0, later));

        assert_eq!(progress.completed_lessons(), &once);
        assert!(is_lesson_complete(&progress, &lid("a")));
        assert!(!is_lesson_complete(&progress, &lid("b")));
        assert_eq!(progress.last_accessed(), later);
    }

    #[test]
    fn complete_lesson_accumulates_score() {
        let mut progress = UserProgress::new(CourseId::new("c").unwrap(), fixed_now());
        complete_lesson(&mut progress, &lid("a"), 67, fixed_now());
        complete_lesson(&mut progress, &lid("b"), 100, fixed_now());
        assert_eq!(progress.score(), 167);
    }

    #[test]
    fn progress_percent_rounds_and_clamps() {
        let c = course(&["a", "b", "c"]);
        let mut progress = UserProgress::new(c.id().clone(), fixed_now());
        assert_eq!(course_progress_percent(&c, None), 0);
        assert_eq!(course_progress_percent(&c, Some(&progress)), 0);

        complete_lesson(&mut progress, &lid("a"), 0, fixed_now());
        assert_eq!(course_progress_percent(&c, Some(&progress)), 33);
        complete_lesson(&mut progress, &lid("b"), 0, fixed_now());
        assert_eq!(course_progress_percent(&c, Some(&progress)), 67);
        complete_lesson(&mut progress, &lid("c"), 0, fixed_now());
        assert_eq!(course_progress_percent(&c, Some(&progress)), 100);

        // Stale ids from an older catalogue never push past 100.
        complete_lesson(&mut progress, &lid("retired"), 0, fixed_now());
        assert_eq!(course_progress_percent(&c, Some(&progress)), 100);
    }

    #[test]
    fn half_rounds_up() {
        let c = course(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let mut progress = UserProgress::new(c.id().clone(), fixed_now());
        complete_lesson(&mut progress, &lid("a"), 0, fixed_now());
        // 12.5% displays as 13.
        assert_eq!(course_progress_percent(&c, Some(&progress)), 13);
    }

    #[test]
    fn resume_points_at_first_incomplete_lesson() {
        let c = course(&["a", "b", "c"]);
        let mut progress = UserProgress::new(c.id().clone(), fixed_now());
        assert_eq!(resume_index(&c, None), 0);

        complete_lesson(&mut progress, &lid("a"), 0, fixed_now());
        complete_lesson(&mut progress, &lid("c"), 0, fixed_now());
        assert_eq!(resume_index(&c, Some(&progress)), 1);
        assert!(!is_course_complete(&c, Some(&progress)));

        complete_lesson(&mut progress, &lid("b"), 0, fixed_now());
        assert_eq!(resume_index(&c, Some(&progress)), 0);
        assert!(is_course_complete(&c, Some(&progress)));
    }

    #[test]
    fn streak_counts_back_from_today() {
        let c = course(&["a", "b", "c", "d"]);
        let mut book = ProgressBook::new();
        let day = |n: i64| fixed_now() + chrono::Duration::days(n);
        for (n, id) in [(0, "a"), (1, "b"), (2, "c"), (4, "d")] {
            complete_lesson(book.entry(c.id(), day(0)), &lid(id), 0, day(n));
        }

        assert_eq!(learning_streak(&book, day(4).date_naive()), 1);
        assert_eq!(learning_streak(&book, day(2).date_naive()), 3);
        // Yesterday's streak is still alive.
        assert_eq!(learning_streak(&book, day(3).date_naive()), 3);
        assert_eq!(learning_streak(&book, day(6).date_naive()), 0);
        assert_eq!(learning_streak(&ProgressBook::new(), day(0).date_naive()), 0);
    }
}
