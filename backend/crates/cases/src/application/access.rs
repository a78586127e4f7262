//! Document Access Gate
//!
//! Document endpoints answer 401 before anything else, then 404 for a
//! missing case or document, and only then 403. Case and user endpoints
//! check the role first instead.

use auth::{AccessPolicy, Action, AuthError, Decision, Principal};

use crate::error::CaseResult;

#[must_use]
pub(crate) struct DocumentGate(Decision);

impl DocumentGate {
    /// Fails with 401 when the action needs a principal and there is none
    pub(crate) fn enter(
        policy: &AccessPolicy,
        caller: Option<&Principal>,
        action: Action,
    ) -> CaseResult<Self> {
        match policy.decide(caller, action) {
            Decision::Unauthenticated => Err(AuthError::NotAuthenticated.into()),
            decision => Ok(Self(decision)),
        }
    }

    /// Call once the target is known to exist
    pub(crate) fn pass(self) -> CaseResult<()> {
        match self.0 {
            Decision::Allow => Ok(()),
            Decision::Forbidden | Decision::Unauthenticated => {
                Err(AuthError::InsufficientRole.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::DocumentAccess;
    use auth::models::{UserName, UserRole};
    use kernel::id::UserId;

    use crate::error::CaseError;

    fn staff() -> Principal {
        Principal {
            user_id: UserId::from_i64(1),
            username: UserName::new("staffer").unwrap(),
            role: UserRole::Staff,
        }
    }

    #[test]
    fn test_unauthenticated_fails_on_enter() {
        let result = DocumentGate::enter(&AccessPolicy::default(), None, Action::ReadDocument);
        assert!(matches!(
            result,
            Err(CaseError::Auth(AuthError::NotAuthenticated))
        ));
    }

    #[test]
    fn test_forbidden_fails_on_pass() {
        let policy = AccessPolicy {
            document_access: DocumentAccess::CaseRoles,
            ..Default::default()
        };
        let p = staff();
        let gate = DocumentGate::enter(&policy, Some(&p), Action::WriteDocument).unwrap();
        assert!(matches!(
            gate.pass(),
            Err(CaseError::Auth(AuthError::InsufficientRole))
        ));
    }

    #[test]
    fn test_open_access_needs_no_principal() {
        let policy = AccessPolicy {
            document_access: DocumentAccess::Open,
            ..Default::default()
        };
        let gate = DocumentGate::enter(&policy, None, Action::DeleteDocument).unwrap();
        assert!(gate.pass().is_ok());
    }
}
