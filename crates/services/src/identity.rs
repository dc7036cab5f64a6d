use async_trait::async_trait;
use learn_core::model::Identity;
use tracing::info;

use crate::error::AccountError;

/// External sign-in collaborator.
///
/// Implementations own the auth protocol; the services only consume the
/// resulting identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `AccountError::SignIn` if the provider rejects or fails the flow.
    async fn sign_in(&self) -> Result<Identity, AccountError>;

    /// # Errors
    ///
    /// Returns `AccountError::SignOut` if the provider cannot end the session.
    async fn sign_out(&self) -> Result<(), AccountError>;
}

/// Provider that always signs in as one fixed identity.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    identity: Identity,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self) -> Result<Identity, AccountError> {
        Ok(self.identity.clone())
    }

    async fn sign_out(&self) -> Result<(), AccountError> {
        info!(uid = %self.identity.uid(), "signed out");
        Ok(())
    }
}
