//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::page::Page;

use crate::domain::entity::{NewUser, User};
use crate::domain::value_object::{Email, UserName};
use crate::error::AuthResult;

/// Credential store
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user. Duplicates surface as `UsernameTaken` / `EmailTaken`.
    async fn create(&self, user: &NewUser) -> AuthResult<User>;

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Ordered by id
    async fn list(&self, page: Page) -> AuthResult<Vec<User>>;

    /// Overwrite every mutable column of an existing user
    async fn update(&self, user: &User) -> AuthResult<()>;

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> AuthResult<()>;

    /// Returns `false` when no row matched
    async fn delete(&self, id: UserId) -> AuthResult<bool>;
}
