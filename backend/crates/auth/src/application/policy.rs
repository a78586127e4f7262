//! Access Control Policy
//!
//! One decision function maps `(principal, action)` to allow/deny. Handlers
//! never inspect roles themselves; they name the [`Action`] and ask.
//!
//! | Action                                | Allowed                         |
//! |---------------------------------------|---------------------------------|
//! | list / read / create / update cases   | admin, attorney                 |
//! | delete case                           | admin                           |
//! | list / read / update / delete users   | admin                           |
//! | read / update own record              | any authenticated user          |
//! | register a non-admin account          | anyone                          |
//! | register an admin account             | admin                           |
//! | documents                             | per [`DocumentAccess`]          |

use std::str::FromStr;

use crate::domain::entity::Principal;
use crate::domain::value_object::UserRole;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListCases,
    ReadCase,
    CreateCase,
    UpdateCase,
    DeleteCase,
    ListUsers,
    ReadUser,
    UpdateUser,
    DeleteUser,
    ReadSelf,
    UpdateSelf,
    Register { role: UserRole },
    ReadDocument,
    WriteDocument,
    DeleteDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No principal, and the action needs one
    Unauthenticated,
    /// Principal present but its role is not enough
    Forbidden,
}

/// Who may touch documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentAccess {
    /// No authentication at all
    Open,
    /// Any authenticated user
    #[default]
    Authenticated,
    /// Same roles as the owning case (admin, attorney)
    CaseRoles,
}

impl FromStr for DocumentAccess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(DocumentAccess::Open),
            "authenticated" => Ok(DocumentAccess::Authenticated),
            "case_roles" => Ok(DocumentAccess::CaseRoles),
            other => Err(format!(
                "unknown document access mode `{other}` (expected open, authenticated or case_roles)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    /// When false, any authenticated principal passes role checks.
    /// Authentication itself is still required.
    pub enforce_roles: bool,
    pub document_access: DocumentAccess,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            enforce_roles: true,
            document_access: DocumentAccess::default(),
        }
    }
}

impl AccessPolicy {
    pub fn decide(&self, principal: Option<&Principal>, action: Action) -> Decision {
        use Action::*;

        match action {
            Register { role } if !role.is_admin() => return Decision::Allow,
            ReadDocument | WriteDocument | DeleteDocument
                if self.document_access == DocumentAccess::Open =>
            {
                return Decision::Allow;
            }
            _ => {}
        }

        let Some(principal) = principal else {
            return Decision::Unauthenticated;
        };

        if !self.enforce_roles {
            return Decision::Allow;
        }

        let role = principal.role;
        let allowed = match action {
            ListCases | ReadCase | CreateCase | UpdateCase => role.is_case_handler(),
            DeleteCase => role.is_admin(),
            ListUsers | ReadUser | UpdateUser | DeleteUser => role.is_admin(),
            ReadSelf | UpdateSelf => true,
            Register { .. } => role.is_admin(),
            ReadDocument | WriteDocument | DeleteDocument => match self.document_access {
                DocumentAccess::CaseRoles => role.is_case_handler(),
                DocumentAccess::Open | DocumentAccess::Authenticated => true,
            },
        };

        if allowed {
            Decision::Allow
        } else {
            Decision::Forbidden
        }
    }

    /// [`decide`](Self::decide) as a `Result` (401 / 403)
    pub fn authorize(&self, principal: Option<&Principal>, action: Action) -> AuthResult<()> {
        match self.decide(principal, action) {
            Decision::Allow => Ok(()),
            Decision::Unauthenticated => Err(AuthError::NotAuthenticated),
            Decision::Forbidden => {
                tracing::info!(
                    user_id = ?principal.map(|p| p.user_id),
                    action = ?action,
                    "Access denied"
                );
                Err(AuthError::InsufficientRole)
            }
        }
    }

    /// Like [`authorize`](Self::authorize) but hands back the principal
    pub fn require<'a>(
        &self,
        principal: Option<&'a Principal>,
        action: Action,
    ) -> AuthResult<&'a Principal> {
        self.authorize(principal, action)?;
        principal.ok_or(AuthError::NotAuthenticated)
    }
}
