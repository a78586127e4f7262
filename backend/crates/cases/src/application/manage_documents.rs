//! Document Management Use Cases
//!
//! Read, download, edit and remove stored documents. Records flagged
//! `deletion_pending` are invisible here except to [`remove`], which retries
//! the file deletion.
//!
//! [`remove`]: ManageDocumentsUseCase::remove

use std::sync::Arc;

use auth::{Action, Principal};
use kernel::id::{CaseId, DocumentId};
use kernel::page::Page;

use crate::application::access::DocumentGate;
use crate::application::config::CasesConfig;
use crate::domain::entity::{Document, Metadata};
use crate::domain::repository::{CaseRepository, DocumentRepository};
use crate::error::{CaseError, CaseResult};
use crate::infra::store::{DocumentStore, sanitize_filename};

/// Editable document fields. `None` leaves a field unchanged; a blank
/// description clears it.
#[derive(Debug, Default)]
pub struct DocumentChanges {
    pub filename: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Metadata>,
}

pub struct ManageDocumentsUseCase<R>
where
    R: CaseRepository + DocumentRepository,
{
    repo: Arc<R>,
    store: Arc<DocumentStore>,
    config: Arc<CasesConfig>,
}

impl<R> ManageDocumentsUseCase<R>
where
    R: CaseRepository + DocumentRepository,
{
    pub fn new(repo: Arc<R>, store: Arc<DocumentStore>, config: Arc<CasesConfig>) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    pub async fn list(
        &self,
        caller: Option<&Principal>,
        case_id: CaseId,
        page: Page,
    ) -> CaseResult<Vec<Document>> {
        let gate = DocumentGate::enter(&self.config.policy, caller, Action::ReadDocument)?;
        if !self.repo.case_exists(case_id).await? {
            return Err(CaseError::CaseNotFound);
        }
        gate.pass()?;

        self.repo.list_documents(case_id, page.normalized()).await
    }

    pub async fn get(&self, caller: Option<&Principal>, id: DocumentId) -> CaseResult<Document> {
        let gate = DocumentGate::enter(&self.config.policy, caller, Action::ReadDocument)?;
        let document = self.load_visible(id).await?;
        gate.pass()?;

        Ok(document)
    }

    /// The record together with the stored bytes
    pub async fn download(
        &self,
        caller: Option<&Principal>,
        id: DocumentId,
    ) -> CaseResult<(Document, Vec<u8>)> {
        let document = self.get(caller, id).await?;
        let data = match self.store.read(&document.file_path).await {
            Ok(data) => data,
            Err(CaseError::Storage(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!(
                    document_id = %id,
                    key = %document.file_path,
                    "Stored file missing for document record"
                );
                return Err(CaseError::DocumentNotFound);
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(document_id = %id, size = data.len(), "Document downloaded");
        Ok((document, data))
    }

    pub async fn update(
        &self,
        caller: Option<&Principal>,
        id: DocumentId,
        changes: DocumentChanges,
    ) -> CaseResult<Document> {
        let gate = DocumentGate::enter(&self.config.policy, caller, Action::WriteDocument)?;
        let mut document = self.load_visible(id).await?;
        gate.pass()?;

        if let Some(filename) = changes.filename {
            document.filename = sanitize_filename(&filename);
        }
        if let Some(description) = changes.description {
            let description = description.trim();
            document.description = (!description.is_empty()).then(|| description.to_string());
        }
        if let Some(metadata) = changes.metadata {
            document.metadata = Some(metadata);
        }

        self.repo
            .update_document(
                id,
                &document.filename,
                document.description.as_deref(),
                document.metadata.as_ref(),
            )
            .await?;

        tracing::info!(document_id = %id, "Document updated");
        Ok(document)
    }

    /// Delete the file, then the record.
    ///
    /// When the file cannot be deleted the record is kept, flagged
    /// `deletion_pending`, and the caller gets a 500. A later `remove` or the
    /// startup reconciliation retries it.
    pub async fn remove(&self, caller: Option<&Principal>, id: DocumentId) -> CaseResult<Document> {
        let gate = DocumentGate::enter(&self.config.policy, caller, Action::DeleteDocument)?;
        let document = self
            .repo
            .find_document(id)
            .await?
            .ok_or(CaseError::DocumentNotFound)?;
        gate.pass()?;

        if let Err(e) = self.store.remove(&document.file_path).await {
            tracing::warn!(
                document_id = %id,
                key = %document.file_path,
                error = %e,
                "File delete failed, flagging record"
            );
            self.repo.mark_deletion_pending(id).await?;
            return Err(e);
        }

        self.repo.delete_document(id).await?;

        tracing::info!(document_id = %id, case_id = %document.case_id, "Document deleted");
        Ok(document)
    }

    async fn load_visible(&self, id: DocumentId) -> CaseResult<Document> {
        match self.repo.find_document(id).await? {
            Some(document) if !document.deletion_pending => Ok(document),
            _ => Err(CaseError::DocumentNotFound),
        }
    }
}
