mod cli;

use std::fmt;
use std::sync::Arc;

use clap::Parser;
use learn_core::model::{Identity, QuizAnswers, UserId};
use services::{AppServices, Clock, LearnerSession, Notice, StaticIdentityProvider};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn dev_identity(uid: String, email: String, name: String) -> Result<Identity, learn_core::Error> {
    Ok(Identity::new(UserId::new(uid)?, email, name, None)?)
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        if notice.is_error() {
            eprintln!("✗ {notice}");
        } else {
            println!("✓ {notice}");
        }
    }
}

fn print_catalog(app: &AppServices) {
    for course in app.catalog().courses() {
        println!(
            "{} [{}] {} · {} · {} XP",
            course.id(),
            course.difficulty(),
            course.title(),
            course.estimated_time(),
            course.xp_reward()
        );
        for (idx, lesson) in course.lessons().iter().enumerate() {
            println!(
                "  {:>2}. {:<24} {:<10} {:>4} XP  {}",
                idx + 1,
                lesson.id().as_str(),
                lesson.kind().as_str(),
                lesson.xp_reward(),
                lesson.title()
            );
        }
    }
}

fn print_profile(app: &AppServices, session: &LearnerSession) {
    let view = app.dashboard().dashboard(session);
    println!("Welcome back, {}!", view.first_name);
    println!(
        "Level {} · {} / 1000 XP ({}%) · {} XP to next level",
        view.level, view.xp_into_level, view.level_percent, view.xp_to_next_level
    );
    println!(
        "Total XP {} · {} course(s) completed · {} badge(s) · {} day(s) active · {} day streak",
        view.total_xp, view.completed_courses, view.badges, view.days_active, view.streak_days
    );
    for badge in session.user().badges() {
        println!("  {} {}: {}", badge.icon, badge.name, badge.description);
    }
    for card in &view.courses {
        let status = if card.completed {
            "done".to_string()
        } else {
            format!("next: {}", card.next_lesson)
        };
        println!(
            "{:>3}%  {:<28} {:<12} {}",
            card.percent,
            card.title,
            card.difficulty.as_str(),
            status
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.db_url.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw: cli.db_url }.into());
    }
    let db_url = normalize_sqlite_url(cli.db_url);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;

    let identity = dev_identity(cli.uid, cli.email, cli.name)?;
    let provider = Arc::new(StaticIdentityProvider::new(identity));
    let app = AppServices::new_sqlite(&db_url, cli.cache_dir, Clock::default_clock(), provider)
        .await?;
    info!(db = %db_url, "storage ready");

    if matches!(cli.command, Command::Catalog) {
        print_catalog(&app);
        return Ok(());
    }
    if matches!(cli.command, Command::SignOut) {
        app.accounts().sign_out().await?;
        println!("Signed out.");
        return Ok(());
    }

    let learning = app.learning();
    let mut session = learning.start().await?;
    if session.source().is_offline() {
        warn!("progress store unreachable, showing cached progress");
    }

    match cli.command {
        Command::Catalog | Command::SignOut => {}
        Command::Profile => print_profile(&app, &session),
        Command::Complete { course, lesson } => {
            let outcome = learning
                .complete_lesson(&mut session, &course, &lesson)
                .await?;
            print_notices(&outcome.notices);
            println!("Course progress: {}%", learning.course_progress(&session, &course)?);
        }
        Command::Quiz {
            course,
            lesson,
            answers,
        } => {
            let answers: QuizAnswers = answers.into_iter().collect();
            let outcome = learning
                .submit_quiz(&mut session, &course, &lesson, &answers)
                .await?;
            print_notices(&outcome.notices);
        }
        Command::Code {
            course,
            lesson,
            file,
            source,
        } => {
            let code = match (file, source) {
                (Some(path), _) => std::fs::read_to_string(path)?,
                (None, Some(source)) => source,
                (None, None) => String::new(),
            };
            let outcome = learning
                .submit_code(&mut session, &course, &lesson, &code)
                .await?;
            print_notices(&outcome.notices);
        }
        Command::Leaderboard { limit } => {
            for entry in app.leaderboard().top(limit).await? {
                let marker = if &entry.uid == session.user().uid() {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker}{:>3}. {:<24} level {:>3}  {:>7} XP",
                    entry.rank, entry.display_name, entry.level, entry.total_xp
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{}", Notice::failure(&err));
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_relative_sqlite_paths() {
        let url = normalize_sqlite_url("sqlite:data/learn.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/learn.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }

    #[test]
    fn dev_identity_is_validated() {
        let identity = dev_identity("u1".into(), "u1@example.com".into(), "Ada".into()).unwrap();
        assert_eq!(identity.uid().as_str(), "u1");
        assert!(matches!(
            dev_identity("u1".into(), "not-an-email".into(), "Ada".into()),
            Err(learn_core::Error::Identity(_))
        ));
        assert!(matches!(
            dev_identity("  ".into(), "u1@example.com".into(), "Ada".into()),
            Err(learn_core::Error::Id(_))
        ));
    }

    #[test]
    fn prepare_creates_missing_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("learn.sqlite3");
        let url = format!("sqlite://{}", path.display());
        prepare_sqlite_file(&url).unwrap();
        assert!(path.exists());
        assert!(prepare_sqlite_file("postgres://nope").is_err());
    }
}
