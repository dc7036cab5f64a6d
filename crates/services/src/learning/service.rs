use std::sync::Arc;

use learn_core::achievements::{Milestone, newly_unlocked};
use learn_core::catalog::Catalog;
use learn_core::grading::{grade_code_submission, grade_quiz};
use learn_core::model::{Course, CourseId, Lesson, LessonId, QuizAnswers};
use learn_core::progression::{
    award_xp, complete_lesson, course_progress_percent, is_course_complete, is_lesson_complete,
    resume_index,
};
use tracing::{debug, info, warn};

use super::outcome::{CodeOutcome, LessonOutcome, QuizOutcome};
use super::session::LearnerSession;
use crate::Clock;
use crate::account_service::AccountService;
use crate::error::SessionError;
use crate::notice::Notice;
use crate::progress_service::ProgressService;

/// Lesson completion, grading, and the XP and badges that follow.
#[derive(Clone)]
pub struct LearningService {
    clock: Clock,
    catalog: Arc<Catalog>,
    accounts: Arc<AccountService>,
    progress: Arc<ProgressService>,
}

impl LearningService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        accounts: Arc<AccountService>,
        progress: Arc<ProgressService>,
    ) -> Self {
        Self {
            clock,
            catalog,
            accounts,
            progress,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Sign in and load the learner's progress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Account` if sign-in fails.
    /// Returns `SessionError::Progress` if no copy of the progress is reachable.
    pub async fn start(&self) -> Result<LearnerSession, SessionError> {
        let user = self.accounts.sign_in().await?;
        let loaded = self.progress.load(user.uid()).await?;
        Ok(LearnerSession::new(user, loaded.book, loaded.source))
    }

    /// Mark a theory or simulation lesson complete.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCourse` or `SessionError::UnknownLesson`
    /// for ids not in the catalogue, and `SessionError::WrongLessonKind` for
    /// quiz and code lessons, which complete only through their graders.
    /// Persistence failures surface as `SessionError::Progress` or
    /// `SessionError::Account`.
    pub async fn complete_lesson(
        &self,
        session: &mut LearnerSession,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonOutcome, SessionError> {
        let (course, lesson) = self.lookup(course, lesson)?;
        if !lesson.kind().is_self_paced() {
            return Err(wrong_kind(lesson));
        }
        self.finish_lesson(session, course, lesson, 0, Milestone::LessonCompleted)
            .await
    }

    /// Grade a quiz and complete the lesson when it passes.
    ///
    /// The score added to course progress is the rounded percentage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IncompleteQuiz` without grading when any
    /// question is unanswered, and `SessionError::WrongLessonKind` if the
    /// lesson is not a quiz. Lookup and persistence errors as for
    /// [`Self::complete_lesson`].
    pub async fn submit_quiz(
        &self,
        session: &mut LearnerSession,
        course: &CourseId,
        lesson: &LessonId,
        answers: &QuizAnswers,
    ) -> Result<QuizOutcome, SessionError> {
        let (course, lesson) = self.lookup(course, lesson)?;
        let questions = lesson.quiz().ok_or_else(|| wrong_kind(lesson))?;
        if !answers.is_complete_for(questions) {
            return Err(SessionError::IncompleteQuiz {
                unanswered: answers.unanswered(questions).len(),
            });
        }

        let grade = grade_quiz(questions, answers);
        let percent = grade.rounded_percent();
        debug!(lesson = %lesson.id(), correct = grade.correct(), total = grade.total(), "quiz graded");

        if !grade.passed() {
            return Ok(QuizOutcome {
                grade,
                completion: None,
                notices: vec![Notice::QuizFailed { percent }],
            });
        }

        let completion = self
            .finish_lesson(
                session,
                course,
                lesson,
                u64::from(percent),
                Milestone::QuizGraded(grade),
            )
            .await?;
        let mut notices = vec![Notice::QuizPassed { percent }];
        notices.extend(completion.notices.iter().cloned());
        Ok(QuizOutcome {
            grade,
            completion: Some(completion),
            notices,
        })
    }

    /// Check a code exercise and complete the lesson when every required
    /// token is present.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongLessonKind` if the lesson is not a code
    /// exercise. Lookup and persistence errors as for
    /// [`Self::complete_lesson`].
    pub async fn submit_code(
        &self,
        session: &mut LearnerSession,
        course: &CourseId,
        lesson: &LessonId,
        code: &str,
    ) -> Result<CodeOutcome, SessionError> {
        let (course, lesson) = self.lookup(course, lesson)?;
        let tokens = lesson.required_tokens().ok_or_else(|| wrong_kind(lesson))?;

        let grade = grade_code_submission(code, tokens);
        debug!(lesson = %lesson.id(), missing = grade.missing().len(), "code checked");

        if !grade.passed() {
            let missing = grade.missing().to_vec();
            return Ok(CodeOutcome {
                grade,
                completion: None,
                notices: vec![Notice::CodeMissingTokens { missing }],
            });
        }

        let completion = self
            .finish_lesson(session, course, lesson, 0, Milestone::CodePassed)
            .await?;
        let mut notices = vec![Notice::CodeAccepted];
        notices.extend(completion.notices.iter().cloned());
        Ok(CodeOutcome {
            grade,
            completion: Some(completion),
            notices,
        })
    }

    /// Whole-percent completion of a course for this learner.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCourse` if the course is not in the catalogue.
    pub fn course_progress(
        &self,
        session: &LearnerSession,
        course: &CourseId,
    ) -> Result<u8, SessionError> {
        let course = self.course(course)?;
        Ok(course_progress_percent(course, session.progress.get(course.id())))
    }

    /// The lesson to open when the learner returns to a course, with its index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownCourse` if the course is not in the catalogue.
    pub fn resume_lesson(
        &self,
        session: &LearnerSession,
        course: &CourseId,
    ) -> Result<(usize, &Lesson), SessionError> {
        let course = self.course(course)?;
        let index = resume_index(course, session.progress.get(course.id()));
        let lesson = course
            .lessons()
            .get(index)
            .ok_or_else(|| SessionError::UnknownCourse(course.id().clone()))?;
        Ok((index, lesson))
    }

    fn course(&self, id: &CourseId) -> Result<&Course, SessionError> {
        self.catalog
            .course(id)
            .ok_or_else(|| SessionError::UnknownCourse(id.clone()))
    }

    fn lookup(
        &self,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<(&Course, &Lesson), SessionError> {
        let found = self.course(course)?;
        let lesson = found
            .lesson(lesson)
            .ok_or_else(|| SessionError::UnknownLesson {
                course: course.clone(),
                lesson: lesson.clone(),
            })?;
        Ok((found, lesson))
    }

    /// Record completion and award XP, course completion, and badges.
    ///
    /// The updated profile is written first, then the course progress. If the
    /// progress write fails the previous profile is restored. The session only
    /// changes once both writes succeed, so a failed attempt can be retried.
    async fn finish_lesson(
        &self,
        session: &mut LearnerSession,
        course: &Course,
        lesson: &Lesson,
        score_delta: u64,
        milestone: Milestone,
    ) -> Result<LessonOutcome, SessionError> {
        let already_done = session
            .progress
            .get(course.id())
            .is_some_and(|p| is_lesson_complete(p, lesson.id()));
        if already_done {
            return Ok(LessonOutcome {
                notices: vec![Notice::AlreadyCompleted {
                    title: lesson.title().to_owned(),
                }],
                ..LessonOutcome::default()
            });
        }

        let now = self.clock.now();
        let uid = session.user.uid().clone();

        let mut book = session.progress.clone();
        complete_lesson(book.entry(course.id(), now), lesson.id(), score_delta, now);

        let xp = u64::from(lesson.xp_reward());
        let award = award_xp(&session.user, xp);
        let leveled_up = award.leveled_up();
        let new_level = award.new_level;
        let mut updated = award.user;

        let mut notices = vec![Notice::LessonCompleted {
            title: lesson.title().to_owned(),
            xp,
        }];
        if leveled_up {
            notices.push(Notice::LevelUp { level: new_level });
        }

        let course_completed = is_course_complete(course, book.get(course.id()))
            && updated.mark_course_completed(course.id().clone());
        if course_completed {
            notices.push(Notice::CourseCompleted {
                title: course.title().to_owned(),
            });
        }

        let badges = newly_unlocked(&updated, &book, &self.catalog, milestone);
        for achievement in &badges {
            updated.unlock_badge(achievement.badge(now));
            notices.push(Notice::BadgeUnlocked {
                name: achievement.name(),
                icon: achievement.icon(),
            });
        }

        self.accounts.save(&updated).await?;
        if let Err(err) = self.progress.record(&uid, &book, course.id()).await {
            if let Err(restore) = self.accounts.save(&session.user).await {
                warn!(%uid, error = %restore, "could not restore profile after failed progress write");
            }
            return Err(err.into());
        }

        info!(%uid, lesson = %lesson.id(), xp, "lesson completed");
        if leveled_up {
            info!(%uid, level = new_level, "level up");
        }
        if course_completed {
            info!(%uid, course = %course.id(), "course completed");
        }
        for achievement in &badges {
            info!(%uid, badge = achievement.slug(), "badge unlocked");
        }

        session.user = updated;
        session.progress = book;

        Ok(LessonOutcome {
            newly_completed: true,
            xp_awarded: xp,
            leveled_up,
            course_completed,
            badges,
            notices,
        })
    }
}

fn wrong_kind(lesson: &Lesson) -> SessionError {
    SessionError::WrongLessonKind {
        lesson: lesson.id().clone(),
        kind: lesson.kind().as_str(),
    }
}
