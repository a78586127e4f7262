//! Resolve Principal Use Case
//!
//! Bearer token → principal, once per request.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::Principal;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;

pub struct ResolvePrincipalUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ResolvePrincipalUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// `Ok(None)` for a missing or invalid token, and for a token whose user
    /// has since been deleted or deactivated. `Err` only for store failures.
    pub async fn execute(&self, token: Option<&str>) -> AuthResult<Option<Principal>> {
        let Some(token) = token else {
            return Ok(None);
        };

        let user_id = match self.config.token_service().verify(token) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                return Ok(None);
            }
        };

        match self.repo.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(Some(user.principal())),
            Some(_) => {
                tracing::debug!(user_id = %user_id, "Token for inactive user");
                Ok(None)
            }
            None => {
                tracing::debug!(user_id = %user_id, "Token for deleted user");
                Ok(None)
            }
        }
    }
}
