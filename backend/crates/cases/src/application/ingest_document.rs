//! Ingest Document Use Case
//!
//! Two phases. [`authorize`](IngestDocumentUseCase::authorize) runs before the
//! request body is read and yields an [`UploadPermit`];
//! [`execute`](IngestDocumentUseCase::execute) validates and stores the upload.
//!
//! Storage order: bytes go to a temp file, the record is inserted and
//! committed, then the temp file is renamed to its final key. Each failure
//! removes what the earlier steps created.

use std::sync::Arc;

use auth::{Action, Principal};
use chrono::Utc;
use kernel::id::CaseId;

use crate::application::access::DocumentGate;
use crate::application::config::CasesConfig;
use crate::domain::entity::{Document, Metadata, NewDocument};
use crate::domain::repository::{CaseRepository, DocumentRepository};
use crate::domain::value_object::ContentType;
use crate::error::{CaseError, CaseResult};
use crate::infra::store::{DocumentStore, sanitize_filename};

/// Storage keys tried per upload before giving up
const MAX_KEY_ATTEMPTS: u32 = 8;

/// Proof that the caller may upload to an existing case
#[derive(Debug)]
pub struct UploadPermit {
    case_id: CaseId,
}

/// A multipart upload as read from the request
#[derive(Debug, Default)]
pub struct Upload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub description: Option<String>,
    /// Serialized JSON object
    pub metadata: Option<String>,
}

/// Parse client metadata. Blank means none; anything but a JSON object is
/// rejected.
pub fn parse_metadata(raw: Option<&str>) -> CaseResult<Option<Metadata>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(CaseError::InvalidMetadata("expected a JSON object".into())),
        Err(e) => Err(CaseError::InvalidMetadata(e.to_string())),
    }
}

pub struct IngestDocumentUseCase<R>
where
    R: CaseRepository + DocumentRepository,
{
    repo: Arc<R>,
    store: Arc<DocumentStore>,
    config: Arc<CasesConfig>,
}

impl<R> IngestDocumentUseCase<R>
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

    pub fn max_upload_bytes(&self) -> u64 {
        self.config.max_upload_bytes
    }

    pub async fn authorize(
        &self,
        caller: Option<&Principal>,
        case_id: CaseId,
    ) -> CaseResult<UploadPermit> {
        let gate = DocumentGate::enter(&self.config.policy, caller, Action::WriteDocument)?;

        if !self.repo.case_exists(case_id).await? {
            return Err(CaseError::CaseNotFound);
        }
        gate.pass()?;

        Ok(UploadPermit { case_id })
    }

    pub async fn execute(&self, permit: UploadPermit, upload: Upload) -> CaseResult<Document> {
        let case_id = permit.case_id;

        let file_type = upload
            .content_type
            .as_deref()
            .and_then(ContentType::from_mime)
            .ok_or_else(|| CaseError::UnsupportedFileType {
                content_type: upload.content_type.clone().unwrap_or_default(),
            })?;

        let max_bytes = self.config.max_upload_bytes;
        if upload.data.len() as u64 > max_bytes {
            return Err(CaseError::FileTooLarge { max_bytes });
        }

        let metadata = parse_metadata(upload.metadata.as_deref())?;
        let description = upload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let filename = sanitize_filename(upload.filename.as_deref().unwrap_or_default());
        let file_size = i64::try_from(upload.data.len())
            .map_err(|_| CaseError::FileTooLarge { max_bytes })?;

        // File-system work starts here
        let temp = self.store.write_temp(case_id, &upload.data).await?;
        let uploaded_at = Utc::now();

        let document = match self
            .insert_record(NewDocument {
                case_id,
                filename,
                file_path: String::new(),
                file_type,
                file_size,
                upload_date: uploaded_at,
                description,
                metadata,
            })
            .await
        {
            Ok(document) => document,
            Err(e) => {
                self.store.discard(temp).await;
                return Err(e);
            }
        };

        if let Err(e) = self.store.commit(&temp, &document.file_path).await {
            tracing::error!(
                document_id = %document.id,
                key = %document.file_path,
                error = %e,
                "Rename failed, rolling back document record"
            );
            if let Err(cleanup) = self.repo.delete_document(document.id).await {
                tracing::error!(
                    document_id = %document.id,
                    error = %cleanup,
                    "Failed to remove record of unstored document"
                );
            }
            self.store.discard(temp).await;
            return Err(e);
        }

        tracing::info!(
            document_id = %document.id,
            case_id = %case_id,
            file_type = %document.file_type,
            size = document.file_size,
            "Document uploaded"
        );
        Ok(document)
    }

    /// Insert under the first free key, retrying when another upload wins
    /// the same key between the existence check and insert.
    async fn insert_record(&self, mut doc: NewDocument) -> CaseResult<Document> {
        for attempt in 0..MAX_KEY_ATTEMPTS {
            doc.file_path = self
                .store
                .free_key(doc.case_id, &doc.filename, doc.upload_date, attempt)
                .await?;

            match self.repo.insert_document(doc.clone()).await {
                Err(CaseError::PathTaken) => {
                    tracing::debug!(key = %doc.file_path, "Key taken, retrying");
                }
                other => return other,
            }
        }

        Err(CaseError::PathTaken)
    }
}
