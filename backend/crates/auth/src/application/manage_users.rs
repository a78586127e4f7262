//! User Management Use Cases
//!
//! Admin operations on arbitrary accounts, plus self-service on one's own.
//! The role check always runs before the lookup, so a non-admin probing
//! `/users/{id}` gets 403 whether or not the id exists.

use std::sync::Arc;

use kernel::id::UserId;
use kernel::page::Page;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::password::hash_password;
use crate::application::policy::Action;
use crate::domain::entity::{Principal, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, UserName, UserRole};
use crate::error::{AuthError, AuthResult};

/// Fields any user may change on their own record
#[derive(Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Fields only an admin may change
#[derive(Default)]
pub struct AdminChanges {
    pub profile: ProfileChanges,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

pub struct ManageUsersUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ManageUsersUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn list(&self, caller: Option<&Principal>, page: Page) -> AuthResult<Vec<User>> {
        self.config.policy.authorize(caller, Action::ListUsers)?;
        self.repo.list(page.normalized()).await
    }

    pub async fn get(&self, caller: Option<&Principal>, id: UserId) -> AuthResult<User> {
        self.config.policy.authorize(caller, Action::ReadUser)?;
        self.load(id).await
    }

    pub async fn update(
        &self,
        caller: Option<&Principal>,
        id: UserId,
        changes: AdminChanges,
    ) -> AuthResult<User> {
        self.config.policy.authorize(caller, Action::UpdateUser)?;
        let mut user = self.load(id).await?;

        self.apply_profile(&mut user, changes.profile).await?;
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }

        self.repo.update(&user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User updated by admin");
        Ok(user)
    }

    pub async fn delete(&self, caller: Option<&Principal>, id: UserId) -> AuthResult<User> {
        self.config.policy.authorize(caller, Action::DeleteUser)?;
        let user = self.load(id).await?;

        if !self.repo.delete(id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(user)
    }

    /// `GET /users/me` and `POST /auth/test-token`
    pub async fn me(&self, caller: Option<&Principal>) -> AuthResult<User> {
        let principal = self.config.policy.require(caller, Action::ReadSelf)?;
        self.load(principal.user_id).await
    }

    pub async fn update_me(
        &self,
        caller: Option<&Principal>,
        changes: ProfileChanges,
    ) -> AuthResult<User> {
        let principal = self.config.policy.require(caller, Action::UpdateSelf)?;
        let mut user = self.load(principal.user_id).await?;

        self.apply_profile(&mut user, changes).await?;
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "User updated own profile");
        Ok(user)
    }

    async fn load(&self, id: UserId) -> AuthResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn apply_profile(&self, user: &mut User, changes: ProfileChanges) -> AuthResult<()> {
        if let Some(raw) = changes.username {
            let username = UserName::new(&raw).map_err(|e| AuthError::Validation(e.to_string()))?;
            if username != user.username {
                if let Some(other) = self.repo.find_by_username(&username).await? {
                    if other.id != user.id {
                        return Err(AuthError::UsernameTaken);
                    }
                }
                user.username = username;
            }
        }

        if let Some(raw) = changes.email {
            let email = Email::new(&raw)?;
            if email != user.email {
                if let Some(other) = self.repo.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(AuthError::EmailTaken);
                    }
                }
                user.email = email;
            }
        }

        if let Some(raw) = changes.password {
            let password = ClearTextPassword::new(raw)?;
            user.password_hash = hash_password(password, &self.config).await?;
        }

        Ok(())
    }
}
