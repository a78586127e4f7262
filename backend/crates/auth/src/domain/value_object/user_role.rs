use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff role. Stored as its lowercase code.
///
/// Unknown codes in a request body are rejected by serde (HTTP 422).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Attorney,
    Paralegal,
    #[default]
    Staff,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Admin,
        UserRole::Attorney,
        UserRole::Paralegal,
        UserRole::Staff,
    ];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Admin => "admin",
            Attorney => "attorney",
            Paralegal => "paralegal",
            Staff => "staff",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Roles allowed to work on case files
    #[inline]
    pub const fn is_case_handler(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Attorney)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("Invalid role: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_code() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
        }
        assert_eq!(UserRole::from_code("superuser"), None);
        assert_eq!(UserRole::from_code("Admin"), None);
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(serde_json::to_string(&UserRole::Attorney).unwrap(), "\"attorney\"");
        assert_eq!(
            serde_json::from_str::<UserRole>("\"paralegal\"").unwrap(),
            UserRole::Paralegal
        );
        assert!(serde_json::from_str::<UserRole>("\"wizard\"").is_err());
    }

    #[test]
    fn test_user_role_checks() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Attorney.is_admin());
        assert!(UserRole::Admin.is_case_handler());
        assert!(UserRole::Attorney.is_case_handler());
        assert!(!UserRole::Paralegal.is_case_handler());
        assert!(!UserRole::Staff.is_case_handler());
    }
}
