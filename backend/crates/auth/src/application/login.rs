//! Login Use Case
//!
//! Exchanges a user name and password for a bearer token.

use std::sync::Arc;

use chrono::Utc;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::password::verify_password;
use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserName;
use crate::error::{AuthError, AuthResult};

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginOutput {
    pub access_token: String,
    pub user: User,
}

pub struct LoginUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Unknown user, malformed input and wrong password all return
    /// [`AuthError::InvalidCredentials`], each after one full password
    /// verification.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let password = ClearTextPassword::new(input.password).ok();
        let user = match UserName::new(&input.username) {
            Ok(username) if password.is_some() => self.repo.find_by_username(&username).await?,
            _ => None,
        };

        let stored = user.as_ref().map(|u| u.password_hash.clone());
        if !verify_password(stored, password, &self.config).await? {
            return Err(AuthError::InvalidCredentials);
        }
        let Some(mut user) = user else {
            return Err(AuthError::InvalidCredentials);
        };

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let now = Utc::now();
        self.repo.record_login(user.id, now).await?;
        user.last_login = Some(now);

        let access_token = self.config.token_service().issue(user.id);

        tracing::info!(user_id = %user.id, role = %user.role, "User signed in");

        Ok(LoginOutput { access_token, user })
    }
}
