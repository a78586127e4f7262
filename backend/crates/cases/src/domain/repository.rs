//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{CaseId, DocumentId};
use kernel::page::Page;

use crate::domain::entity::{Case, CaseFields, Document, Metadata, NewDocument};
use crate::error::CaseResult;

/// Case repository trait
#[trait_variant::make(CaseRepository: Send)]
pub trait LocalCaseRepository {
    /// Duplicate case numbers surface as `CaseNumberTaken`
    async fn create_case(&self, fields: &CaseFields, now: DateTime<Utc>) -> CaseResult<Case>;

    async fn find_case(&self, id: CaseId) -> CaseResult<Option<Case>>;

    async fn case_exists(&self, id: CaseId) -> CaseResult<bool>;

    /// Ordered by id
    async fn list_cases(&self, page: Page) -> CaseResult<Vec<Case>>;

    async fn update_case(&self, case: &Case) -> CaseResult<()>;

    /// Removes the case and, by cascade, its document records.
    /// Returns `false` when no row matched.
    async fn delete_case(&self, id: CaseId) -> CaseResult<bool>;
}

/// Document repository trait
#[trait_variant::make(DocumentRepository: Send)]
pub trait LocalDocumentRepository {
    /// Insert in its own transaction. A taken `file_path` surfaces as
    /// `PathTaken`, a missing case as `CaseNotFound`.
    async fn insert_document(&self, doc: NewDocument) -> CaseResult<Document>;

    /// Includes records awaiting deletion
    async fn find_document(&self, id: DocumentId) -> CaseResult<Option<Document>>;

    /// Excludes records awaiting deletion. Ordered by id.
    async fn list_documents(&self, case_id: CaseId, page: Page) -> CaseResult<Vec<Document>>;

    async fn update_document(
        &self,
        id: DocumentId,
        filename: &str,
        description: Option<&str>,
        metadata: Option<&Metadata>,
    ) -> CaseResult<()>;

    async fn delete_document(&self, id: DocumentId) -> CaseResult<bool>;

    async fn mark_deletion_pending(&self, id: DocumentId) -> CaseResult<()>;

    async fn list_deletion_pending(&self) -> CaseResult<Vec<Document>>;
}
