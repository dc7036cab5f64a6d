use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use learn_core::model::{CourseId, LessonId, QuestionId};

/// Arduino learning progress from the terminal.
#[derive(Debug, Parser)]
#[command(name = "learn", version, about)]
pub struct Cli {
    /// `SQLite` database holding profiles and course progress.
    #[arg(long = "db", env = "LEARN_DB_URL", default_value = "sqlite://learn.sqlite3")]
    pub db_url: String,

    /// Directory for the local progress cache.
    #[arg(long, env = "LEARN_CACHE_DIR", default_value = ".learn-cache")]
    pub cache_dir: PathBuf,

    /// Identity used for sign-in.
    #[arg(long, env = "LEARN_UID", default_value = "local-learner")]
    pub uid: String,

    #[arg(long, env = "LEARN_EMAIL", default_value = "learner@localhost")]
    pub email: String,

    #[arg(long, env = "LEARN_NAME", default_value = "Arduino Learner")]
    pub name: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List courses and their lessons.
    Catalog,
    /// Show level, XP, badges, and course progress.
    Profile,
    /// Mark a theory or simulation lesson complete.
    Complete {
        #[arg(value_parser = parse_course)]
        course: CourseId,
        #[arg(value_parser = parse_lesson)]
        lesson: LessonId,
    },
    /// Submit quiz answers, e.g. `--answer q1=1 --answer q2=0`.
    Quiz {
        #[arg(value_parser = parse_course)]
        course: CourseId,
        #[arg(value_parser = parse_lesson)]
        lesson: LessonId,
        #[arg(long = "answer", short, value_parser = parse_answer)]
        answers: Vec<(QuestionId, usize)>,
    },
    /// Submit code for a code exercise.
    #[command(group(ArgGroup::new("input").required(true).args(["file", "source"])))]
    Code {
        #[arg(value_parser = parse_course)]
        course: CourseId,
        #[arg(value_parser = parse_lesson)]
        lesson: LessonId,
        /// Read the sketch from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// The sketch as inline text.
        source: Option<String>,
    },
    /// Show the top learners by XP.
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// End the session with the identity provider.
    SignOut,
}

fn parse_course(raw: &str) -> Result<CourseId, String> {
    CourseId::new(raw).map_err(|e| e.to_string())
}

fn parse_lesson(raw: &str) -> Result<LessonId, String> {
    LessonId::new(raw).map_err(|e| e.to_string())
}

/// Parses `question=option`, with the option as a zero-based index.
fn parse_answer(raw: &str) -> Result<(QuestionId, usize), String> {
    let (question, option) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=OPTION, got {raw:?}"))?;
    let question = QuestionId::new(question).map_err(|e| e.to_string())?;
    let option = option
        .trim()
        .parse()
        .map_err(|_| format!("option must be a number, got {option:?}"))?;
    Ok((question, option))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quiz_answers() {
        let (q, option) = parse_answer("q2=1").unwrap();
        assert_eq!(q.as_str(), "q2");
        assert_eq!(option, 1);
        assert!(parse_answer("q2").is_err());
        assert!(parse_answer("q2=b").is_err());
        assert!(parse_answer(" =1").is_err());
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "learn",
            "quiz",
            "arduino-basics",
            "digital-quiz",
            "-a",
            "q1=1",
            "--answer",
            "q2=1",
        ])
        .unwrap();
        match cli.command {
            Command::Quiz { answers, .. } => assert_eq!(answers.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn code_needs_some_input() {
        assert!(Cli::try_parse_from(["learn", "code", "arduino-basics", "blink-practice"]).is_err());
        assert!(
            Cli::try_parse_from([
                "learn",
                "code",
                "arduino-basics",
                "blink-practice",
                "delay(1);"
            ])
            .is_ok()
        );
    }
}
