#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod leaderboard_service;
pub mod learning;
pub mod notice;
pub mod progress_service;

pub use learn_core::Clock;

pub use account_service::AccountService;
pub use app_services::AppServices;
pub use dashboard::{CourseCard, Dashboard, DashboardService};
pub use error::{
    AccountError, AppServicesError, LeaderboardError, ProgressError, SessionError,
};
pub use identity::{IdentityProvider, StaticIdentityProvider};
pub use leaderboard_service::LeaderboardService;
pub use learning::{CodeOutcome, LearnerSession, LearningService, LessonOutcome, QuizOutcome};
pub use notice::Notice;
pub use progress_service::{LoadedProgress, ProgressService, ProgressSource};
