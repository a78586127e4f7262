//! Initial Admin Bootstrap
//!
//! Creates the first admin account on startup when it does not exist yet.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::password::hash_password;
use crate::domain::entity::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, UserName, UserRole};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct Superuser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Superuser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Superuser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct EnsureSuperuserUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> EnsureSuperuserUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Returns `true` when an account was created
    pub async fn execute(&self, superuser: Superuser) -> AuthResult<bool> {
        let username =
            UserName::new(&superuser.username).map_err(|e| AuthError::Validation(e.to_string()))?;

        if self.repo.find_by_username(&username).await?.is_some() {
            return Ok(false);
        }

        let email = Email::new(&superuser.email)?;
        let password = ClearTextPassword::new(superuser.password)?;
        let password_hash = hash_password(password, &self.config).await?;

        let user = self
            .repo
            .create(&NewUser::new(username, email, password_hash, UserRole::Admin))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Initial admin created");
        Ok(true)
    }
}
