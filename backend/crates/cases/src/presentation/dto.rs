//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{AttorneyId, CaseId, ClientId, DocumentId};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Case, CaseDraft, CasePatch, Document, Metadata};

// ============================================================================
// Cases
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCaseRequest {
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

impl From<CreateCaseRequest> for CaseDraft {
    fn from(req: CreateCaseRequest) -> Self {
        Self {
            case_number: req.case_number,
            title: req.title,
            case_type: req.case_type,
            status: req.status,
            court: req.court,
            jurisdiction: req.jurisdiction,
            filing_date: req.filing_date,
            description: req.description,
            practice_area: req.practice_area,
            statute_of_limitations: req.statute_of_limitations,
            opposing_counsel: req.opposing_counsel,
            judge: req.judge,
            assigned_attorney_id: req.assigned_attorney_id,
            client_id: req.client_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCaseRequest {
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

impl From<UpdateCaseRequest> for CasePatch {
    fn from(req: UpdateCaseRequest) -> Self {
        Self {
            case_number: req.case_number,
            title: req.title,
            case_type: req.case_type,
            status: req.status,
            court: req.court,
            jurisdiction: req.jurisdiction,
            filing_date: req.filing_date,
            description: req.description,
            practice_area: req.practice_area,
            statute_of_limitations: req.statute_of_limitations,
            opposing_counsel: req.opposing_counsel,
            judge: req.judge,
            assigned_attorney_id: req.assigned_attorney_id,
            client_id: req.client_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResponse {
    pub id: CaseId,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Case> for CaseResponse {
    fn from(case: Case) -> Self {
        let f = case.fields;
        Self {
            id: case.id,
            case_number: f.case_number.as_str().to_string(),
            title: f.title,
            case_type: f.case_type,
            status: f.status,
            court: f.court,
            jurisdiction: f.jurisdiction,
            filing_date: f.filing_date,
            description: f.description,
            practice_area: f.practice_area,
            statute_of_limitations: f.statute_of_limitations,
            opposing_counsel: f.opposing_counsel,
            judge: f.judge,
            assigned_attorney_id: f.assigned_attorney_id,
            client_id: f.client_id,
            created_at: case.created_at,
            updated_at: case.updated_at,
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub case_id: CaseId,
    pub filename: String,
    /// Storage key relative to the upload root
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    pub description: Option<String>,
    pub document_metadata: Option<Metadata>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            case_id: doc.case_id,
            filename: doc.filename,
            file_path: doc.file_path,
            file_type: doc.file_type.mime().to_string(),
            file_size: doc.file_size,
            upload_date: doc.upload_date,
            description: doc.description,
            document_metadata: doc.metadata,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentRequest {
    pub filename: Option<String>,
    pub description: Option<String>,
    pub document_metadata: Option<Metadata>,
}
