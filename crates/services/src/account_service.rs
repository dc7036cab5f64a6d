use std::sync::Arc;

use learn_core::model::{User, UserId};
use learn_core::progression::{XpAward, award_xp};
use storage::repository::UserRepository;
use tracing::info;

use crate::Clock;
use crate::error::AccountError;
use crate::identity::IdentityProvider;

/// Signs learners in and keeps their profile document current.
#[derive(Clone)]
pub struct AccountService {
    clock: Clock,
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            users,
        }
    }

    /// Sign in and load the learner's profile, creating it on first sign-in.
    ///
    /// A new profile starts at level 1 with no XP, courses, or badges.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::SignIn` if the provider fails.
    /// Returns `AccountError::Storage` if the profile cannot be read or created.
    pub async fn sign_in(&self) -> Result<User, AccountError> {
        let identity = self.identity.sign_in().await?;
        if let Some(user) = self.users.get_user(identity.uid()).await? {
            info!(uid = %user.uid(), level = user.level(), "signed in");
            return Ok(user);
        }

        let user = User::new(identity, self.clock.now());
        self.users.upsert_user(&user).await?;
        info!(uid = %user.uid(), "created learner profile");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `AccountError::SignOut` if the provider fails.
    pub async fn sign_out(&self) -> Result<(), AccountError> {
        self.identity.sign_out().await
    }

    /// Add XP to `user` and persist the result.
    ///
    /// The caller's `user` is never modified; on success the returned award
    /// carries the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the profile cannot be written.
    pub async fn award_xp(&self, user: &User, amount: u64) -> Result<XpAward, AccountError> {
        let award = award_xp(user, amount);
        self.users.upsert_user(&award.user).await?;
        if award.leveled_up() {
            info!(uid = %user.uid(), level = award.new_level, "level up");
        }
        Ok(award)
    }

    /// Persist a modified profile.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the profile cannot be written.
    pub async fn save(&self, user: &User) -> Result<(), AccountError> {
        self.users.upsert_user(user).await?;
        Ok(())
    }

    /// Re-read a profile from the document store.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the profile cannot be read.
    pub async fn refresh(&self, uid: &UserId) -> Result<Option<User>, AccountError> {
        Ok(self.users.get_user(uid).await?)
    }
}
