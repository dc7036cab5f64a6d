use std::fmt;

/// Short user-facing message produced by a service call.
///
/// Front ends show these as transient notifications; nothing reads them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LessonCompleted { title: String, xp: u64 },
    AlreadyCompleted { title: String },
    LevelUp { level: u32 },
    CourseCompleted { title: String },
    BadgeUnlocked { name: &'static str, icon: &'static str },
    QuizPassed { percent: u32 },
    QuizFailed { percent: u32 },
    CodeAccepted,
    CodeMissingTokens { missing: Vec<String> },
    Failure { message: String },
}

impl Notice {
    /// Wrap an error as a failure notice.
    pub fn failure(err: &impl fmt::Display) -> Self {
        Self::Failure {
            message: err.to_string(),
        }
    }

    /// True for notices that report something going wrong.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::QuizFailed { .. } | Self::CodeMissingTokens { .. } | Self::Failure { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LessonCompleted { xp, .. } => write!(f, "Lesson completed! +{xp} XP"),
            Self::AlreadyCompleted { title } => write!(f, "{title} is already completed"),
            Self::LevelUp { level } => write!(f, "Level up! You reached level {level}"),
            Self::CourseCompleted { title } => write!(f, "Course completed: {title}"),
            Self::BadgeUnlocked { name, icon } => write!(f, "Badge unlocked: {icon} {name}"),
            Self::QuizPassed { percent } => write!(f, "Quiz completed! Score: {percent}%"),
            Self::QuizFailed { percent } => {
                write!(f, "Score too low: {percent}%. Try again!")
            }
            Self::CodeAccepted => f.write_str("Code looks great! Well done!"),
            Self::CodeMissingTokens { missing } => write!(f, "Missing: {}", missing.join(", ")),
            Self::Failure { message } => f.write_str(message),
        }
    }
}
