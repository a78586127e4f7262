//! Case Entity
//!
//! A matter handled by the firm. Only the fields documents and access control
//! rely on are validated; the rest is free text.

use chrono::{DateTime, Utc};
use kernel::id::{AttorneyId, CaseId, ClientId};

use crate::domain::value_object::CaseNumber;
use crate::error::{CaseError, CaseResult};

const SHORT_TEXT_MAX_LENGTH: usize = 100;
const TITLE_MAX_LENGTH: usize = 255;

/// Validated, editable case fields
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFields {
    pub case_number: CaseNumber,
    pub title: String,
    pub case_type: String,
    pub status: String,
    pub court: Option<String>,
    pub jurisdiction: Option<String>,
    pub filing_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub practice_area: Option<String>,
    pub statute_of_limitations: Option<DateTime<Utc>>,
    pub opposing_counsel: Option<String>,
    pub judge: Option<String>,
    pub assigned_attorney_id: Option<AttorneyId>,
    pub client_id: Option<ClientId>,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub id: CaseId,
    pub fields: CaseFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated input for a new case
#[derive(Debug, Clone, Default)]
pub struct CaseDraft {
    pub case_number: String,
    pub title: String,
    pub case_type: String,
    pub status: String,
    pub court: Option<String>,
    pub jurisdiction: Option<String>,
    pub filing_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub practice_area: Option<String>,
    pub statute_of_limitations: Option<DateTime<Utc>>,
    pub opposing_counsel: Option<String>,
    pub judge: Option<String>,
    pub assigned_attorney_id: Option<AttorneyId>,
    pub client_id: Option<ClientId>,
}

/// Partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CasePatch {
    pub case_number: Option<String>,
    pub title: Option<String>,
    pub case_type: Option<String>,
    pub status: Option<String>,
    pub court: Option<String>,
    pub jurisdiction: Option<String>,
    pub filing_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub practice_area: Option<String>,
    pub statute_of_limitations: Option<DateTime<Utc>>,
    pub opposing_counsel: Option<String>,
    pub judge: Option<String>,
    pub assigned_attorney_id: Option<AttorneyId>,
    pub client_id: Option<ClientId>,
}

impl CaseDraft {
    pub fn validate(self) -> CaseResult<CaseFields> {
        Ok(CaseFields {
            case_number: CaseNumber::new(&self.case_number)?,
            title: required("title", &self.title, TITLE_MAX_LENGTH)?,
            case_type: required("case_type", &self.case_type, SHORT_TEXT_MAX_LENGTH)?,
            status: required("status", &self.status, SHORT_TEXT_MAX_LENGTH)?,
            court: optional(self.court),
            jurisdiction: optional(self.jurisdiction),
            filing_date: self.filing_date,
            description: optional(self.description),
            practice_area: optional(self.practice_area),
            statute_of_limitations: self.statute_of_limitations,
            opposing_counsel: optional(self.opposing_counsel),
            judge: optional(self.judge),
            assigned_attorney_id: self.assigned_attorney_id,
            client_id: self.client_id,
        })
    }
}

impl CaseFields {
    /// Apply a patch, validating every supplied field before changing any
    pub fn apply(&mut self, patch: CasePatch) -> CaseResult<()> {
        let case_number = patch
            .case_number
            .as_deref()
            .map(CaseNumber::new)
            .transpose()?;
        let title = patch
            .title
            .as_deref()
            .map(|v| required("title", v, TITLE_MAX_LENGTH))
            .transpose()?;
        let case_type = patch
            .case_type
            .as_deref()
            .map(|v| required("case_type", v, SHORT_TEXT_MAX_LENGTH))
            .transpose()?;
        let status = patch
            .status
            .as_deref()
            .map(|v| required("status", v, SHORT_TEXT_MAX_LENGTH))
            .transpose()?;

        if let Some(v) = case_number {
            self.case_number = v;
        }
        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = case_type {
            self.case_type = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if patch.court.is_some() {
            self.court = optional(patch.court);
        }
        if patch.jurisdiction.is_some() {
            self.jurisdiction = optional(patch.jurisdiction);
        }
        if patch.filing_date.is_some() {
            self.filing_date = patch.filing_date;
        }
        if patch.description.is_some() {
            self.description = optional(patch.description);
        }
        if patch.practice_area.is_some() {
            self.practice_area = optional(patch.practice_area);
        }
        if patch.statute_of_limitations.is_some() {
            self.statute_of_limitations = patch.statute_of_limitations;
        }
        if patch.opposing_counsel.is_some() {
            self.opposing_counsel = optional(patch.opposing_counsel);
        }
        if patch.judge.is_some() {
            self.judge = optional(patch.judge);
        }
        if patch.assigned_attorney_id.is_some() {
            self.assigned_attorney_id = patch.assigned_attorney_id;
        }
        if patch.client_id.is_some() {
            self.client_id = patch.client_id;
        }

        Ok(())
    }
}

fn required(field: &str, raw: &str, max: usize) -> CaseResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CaseError::Validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max {
        return Err(CaseError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Blank optional text is stored as NULL
fn optional(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
