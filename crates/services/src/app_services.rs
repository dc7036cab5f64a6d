use std::path::PathBuf;
use std::sync::Arc;

use learn_core::catalog::Catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::dashboard::DashboardService;
use crate::error::AppServicesError;
use crate::identity::IdentityProvider;
use crate::leaderboard_service::LeaderboardService;
use crate::learning::LearningService;
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    accounts: Arc<AccountService>,
    progress: Arc<ProgressService>,
    learning: Arc<LearningService>,
    leaderboard: Arc<LeaderboardService>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and a JSON file cache.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// built-in catalogue is malformed.
    pub async fn new_sqlite(
        db_url: &str,
        cache_dir: impl Into<PathBuf>,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url, cache_dir).await?;
        Self::from_storage(storage, clock, identity)
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the built-in catalogue is malformed.
    pub fn in_memory(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), clock, identity)
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the built-in catalogue is malformed.
    pub fn from_storage(
        storage: Storage,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::builtin()?);
        let accounts = Arc::new(AccountService::new(
            clock,
            identity,
            Arc::clone(&storage.users),
        ));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.progress),
            Arc::clone(&storage.cache),
        ));
        let learning = Arc::new(LearningService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&accounts),
            Arc::clone(&progress),
        ));
        let leaderboard = Arc::new(LeaderboardService::new(Arc::clone(&storage.users)));
        let dashboard = Arc::new(DashboardService::new(clock, Arc::clone(&catalog)));

        Ok(Self {
            catalog,
            accounts,
            progress,
            learning,
            leaderboard,
            dashboard,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn learning(&self) -> Arc<LearningService> {
        Arc::clone(&self.learning)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
