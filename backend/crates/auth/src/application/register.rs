//! Register Use Case
//!
//! Creates a staff account. Anyone may register a non-admin role; an admin
//! account can only be created by an admin.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::password::hash_password;
use crate::application::policy::Action;
use crate::domain::entity::{NewUser, Principal, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, UserName, UserRole};
use crate::error::{AuthError, AuthResult};

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub struct RegisterUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        caller: Option<&Principal>,
        input: RegisterInput,
    ) -> AuthResult<User> {
        self.config
            .policy
            .authorize(caller, Action::Register { role: input.role })?;

        let username =
            UserName::new(&input.username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(&input.email)?;
        let password = ClearTextPassword::new(input.password)?;

        if self.repo.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password, &self.config).await?;
        let user = self
            .repo
            .create(&NewUser::new(username, email, password_hash, input.role))
            .await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            role = %user.role,
            "User registered"
        );

        Ok(user)
    }
}
