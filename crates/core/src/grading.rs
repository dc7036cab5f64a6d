//! Quiz scoring and keyword-based code checks.

use crate::model::{QuizAnswers, QuizQuestion};

/// Minimum quiz percentage that counts as a pass.
pub const PASSING_SCORE: u32 = 70;

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizGrade {
    correct: u32,
    total: u32,
}

impl QuizGrade {
    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Exact score in `[0, 100]`; an empty quiz scores 0.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) * 100.0 / f64::from(self.total)
    }

    /// Score rounded to a whole percent for display.
    #[must_use]
    pub fn rounded_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let correct = u64::from(self.correct);
        let total = u64::from(self.total);
        // correct <= total, so the result is at most 100.
        u32::try_from((correct * 200 + total) / (total * 2)).unwrap_or(100)
    }

    /// Compares the exact ratio, so 69.9% never rounds into a pass.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.total > 0 && u64::from(self.correct) * 100 >= u64::from(PASSING_SCORE) * u64::from(self.total)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// Count the questions whose chosen option matches the correct answer.
///
/// Unanswered questions count as wrong; the session layer rejects
/// incomplete answer sets before calling this.
#[must_use]
pub fn grade_quiz(questions: &[QuizQuestion], answers: &QuizAnswers) -> QuizGrade {
    let correct = questions
        .iter()
        .filter(|q| answers.get(q.id()).is_some_and(|chosen| q.is_correct(chosen)))
        .count();

    QuizGrade {
        correct: u32::try_from(correct).unwrap_or(u32::MAX),
        total: u32::try_from(questions.len()).unwrap_or(u32::MAX),
    }
}

//
// ─── CODE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGrade {
    missing: Vec<String>,
}

impl CodeGrade {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }

    /// Required tokens not found, in the order they were required.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

/// Check that every required token appears in `code`, ignoring case.
///
/// This is a plain substring test; the code is never parsed.
#[must_use]
pub fn grade_code_submission<S: AsRef<str>>(code: &str, required_tokens: &[S]) -> CodeGrade {
    let haystack = code.to_lowercase();
    let mut missing: Vec<String> = Vec::new();

    for token in required_tokens {
        let token = token.as_ref();
        if haystack.contains(&token.to_lowercase()) || missing.iter().any(|m| m == token) {
            continue;
        }
        missing.push(token.to_string());
    }

    CodeGrade { missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn quiz() -> Vec<QuizQuestion> {
        [("q1", 1), ("q2", 1), ("q3", 2)]
            .into_iter()
            .map(|(id, correct)| {
                QuizQuestion::new(
                    qid(id),
                    "Prompt",
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct,
                    "",
                )
                .unwrap()
            })
            .collect()
    }

    fn answers(chosen: [usize; 3]) -> QuizAnswers {
        ["q1", "q2", "q3"]
            .into_iter()
            .zip(chosen)
            .map(|(id, option)| (qid(id), option))
            .collect()
    }

    #[test]
    fn two_of_three_scores_two_thirds() {
        let grade = grade_quiz(&quiz(), &answers([1, 1, 0]));
        assert_eq!(grade.correct(), 2);
        assert_eq!(grade.total(), 3);
        assert_eq!((grade.percent() * 100.0).round() / 100.0, 66.67);
        assert_eq!(grade.rounded_percent(), 67);
        assert!(!grade.passed());
    }

    #[test]
    fn none_and_all_correct() {
        let none = grade_quiz(&quiz(), &answers([0, 0, 0]));
        assert_eq!(none.percent(), 0.0);
        assert_eq!(none.rounded_percent(), 0);

        let all = grade_quiz(&quiz(), &answers([1, 1, 2]));
        assert_eq!(all.percent(), 100.0);
        assert!(all.passed());
        assert!(all.is_perfect());
    }

    #[test]
    fn passing_threshold_is_inclusive() {
        let questions: Vec<QuizQuestion> = (0..10)
            .map(|i| {
                QuizQuestion::new(qid(&format!("q{i}")), "P", vec!["a".into(), "b".into()], 0, "")
                    .unwrap()
            })
            .collect();
        let seven: QuizAnswers = (0..10)
            .map(|i| (qid(&format!("q{i}")), usize::from(i >= 7)))
            .collect();
        let grade = grade_quiz(&questions, &seven);
        assert_eq!(grade.rounded_percent(), 70);
        assert!(grade.passed());
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let partial = QuizAnswers::new().with(qid("q1"), 1);
        let grade = grade_quiz(&quiz(), &partial);
        assert_eq!(grade.correct(), 1);
        assert_eq!(grade.total(), 3);
    }

    #[test]
    fn rounding_holds_for_huge_quizzes() {
        let grade = QuizGrade {
            correct: u32::MAX / 2,
            total: u32::MAX,
        };
        assert_eq!(grade.rounded_percent(), 50);
        assert!(!grade.passed());

        let all = QuizGrade {
            correct: u32::MAX,
            total: u32::MAX,
        };
        assert_eq!(all.rounded_percent(), 100);
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let grade = grade_quiz(&[], &QuizAnswers::new());
        assert_eq!(grade.percent(), 0.0);
        assert!(!grade.passed());
        assert!(!grade.is_perfect());
    }

    #[test]
    fn blink_sketch_passes() {
        let grade = grade_code_submission(
            "pinMode(13,OUTPUT); digitalWrite(13,HIGH); delay(1000);",
            &["pinMode", "digitalWrite", "delay"],
        );
        assert!(grade.passed());
        assert!(grade.missing().is_empty());
    }

    #[test]
    fn missing_tokens_are_listed_in_order() {
        let grade =
            grade_code_submission("digitalWrite(13,HIGH);", &["pinMode", "digitalWrite", "delay"]);
        assert!(!grade.passed());
        assert_eq!(grade.missing(), ["pinMode", "delay"]);
    }

    #[test]
    fn matching_ignores_case() {
        let grade = grade_code_submission("PINMODE(13, output);", &["pinMode"]);
        assert!(grade.passed());
    }

    #[test]
    fn duplicate_tokens_are_reported_once() {
        let grade = grade_code_submission("", &["delay", "delay"]);
        assert_eq!(grade.missing(), ["delay"]);
    }
}
