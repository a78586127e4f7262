//! Principal
//!
//! The authenticated caller of one request, as seen by the access policy.

use kernel::id::UserId;

use crate::domain::value_object::{UserName, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: UserName,
    pub role: UserRole,
}
