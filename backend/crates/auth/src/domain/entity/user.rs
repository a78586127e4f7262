//! User Entity
//!
//! A staff account: identity, credential digest, role and activity timestamps.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::entity::principal::Principal;
use crate::domain::value_object::{Email, UserName, UserRole};

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: UserName,
    pub email: Email,
    /// Argon2id PHC string. Never serialized.
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// A user that has not been assigned an id yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: UserName,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(
        username: UserName,
        email: Email,
        password_hash: HashedPassword,
        role: UserRole,
    ) -> Self {
        Self {
            username,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}
