//! Case Number Value Object

use std::fmt;

use serde::Serialize;

use crate::error::{CaseError, CaseResult};

pub const CASE_NUMBER_MAX_LENGTH: usize = 50;

/// Docket identifier, unique across cases. Trimmed, otherwise free-form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CaseNumber(String);

impl CaseNumber {
    pub fn new(raw: &str) -> CaseResult<Self> {
        let value = raw.trim();

        if value.is_empty() {
            return Err(CaseError::Validation("Case number cannot be empty".into()));
        }
        if value.chars().count() > CASE_NUMBER_MAX_LENGTH {
            return Err(CaseError::Validation(format!(
                "Case number must be at most {CASE_NUMBER_MAX_LENGTH} characters"
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(CaseError::Validation(
                "Case number contains invalid characters".into(),
            ));
        }

        Ok(Self(value.to_string()))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims() {
        assert_eq!(CaseNumber::new("  CV-2025-001 ").unwrap().as_str(), "CV-2025-001");
    }

    #[test]
    fn test_rejects_empty_and_long() {
        assert!(matches!(CaseNumber::new("   "), Err(CaseError::Validation(_))));
        assert!(CaseNumber::new(&"9".repeat(CASE_NUMBER_MAX_LENGTH + 1)).is_err());
        assert!(CaseNumber::new("CV\n1").is_err());
    }
}
