//! Document Entity
//!
//! An uploaded file attached to exactly one case. `file_path` is a key
//! relative to the upload root, always chosen by the server.

use chrono::{DateTime, Utc};
use kernel::id::{CaseId, DocumentId};

use crate::domain::value_object::ContentType;

/// Opaque client key-value metadata, kept as a JSON object
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub case_id: CaseId,
    /// Display name (sanitized client file name)
    pub filename: String,
    pub file_path: String,
    pub file_type: ContentType,
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
    /// The file could not be removed; the record only awaits cleanup
    pub deletion_pending: bool,
}

/// A document record about to be inserted
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub case_id: CaseId,
    pub filename: String,
    pub file_path: String,
    pub file_type: ContentType,
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
}

impl NewDocument {
    pub fn into_document(self, id: DocumentId) -> Document {
        Document {
            id,
            case_id: self.case_id,
            filename: self.filename,
            file_path: self.file_path,
            file_type: self.file_type,
            file_size: self.file_size,
            upload_date: self.upload_date,
            description: self.description,
            metadata: self.metadata,
            deletion_pending: false,
        }
    }
}
