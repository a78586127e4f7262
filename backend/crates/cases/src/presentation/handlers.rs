//! HTTP Handlers

use std::sync::Arc;

use auth::RequestContext;
use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use kernel::id::{CaseId, DocumentId};
use kernel::page::Page;

use crate::application::config::CasesConfig;
use crate::application::{
    DocumentChanges, IngestDocumentUseCase, ManageCasesUseCase, ManageDocumentsUseCase, Upload,
};
use crate::domain::repository::{CaseRepository, DocumentRepository};
use crate::error::{CaseError, CaseResult};
use crate::infra::store::DocumentStore;
use crate::presentation::dto::{
    CaseResponse, CreateCaseRequest, DocumentResponse, UpdateCaseRequest, UpdateDocumentRequest,
};

/// Shared state for case and document handlers
pub struct CasesAppState<R>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub store: Arc<DocumentStore>,
    pub config: Arc<CasesConfig>,
}

impl<R> CasesAppState<R>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    pub fn new(repo: R, store: DocumentStore, config: CasesConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    fn cases(&self) -> ManageCasesUseCase<R> {
        ManageCasesUseCase::new(self.repo.clone(), self.store.clone(), self.config.clone())
    }

    fn documents(&self) -> ManageDocumentsUseCase<R> {
        ManageDocumentsUseCase::new(self.repo.clone(), self.store.clone(), self.config.clone())
    }

    fn ingest(&self) -> IngestDocumentUseCase<R> {
        IngestDocumentUseCase::new(self.repo.clone(), self.store.clone(), self.config.clone())
    }
}

// manual impl: no `R: Clone` bound
impl<R> Clone for CasesAppState<R>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Cases
// ============================================================================

/// GET /cases
pub async fn list_cases<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Query(page): Query<Page>,
) -> CaseResult<Json<Vec<CaseResponse>>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let cases = state.cases().list(ctx.principal(), page).await?;
    Ok(Json(cases.into_iter().map(CaseResponse::from).collect()))
}

/// POST /cases
pub async fn create_case<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Json(req): Json<CreateCaseRequest>,
) -> CaseResult<Json<CaseResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let case = state.cases().create(ctx.principal(), req.into()).await?;
    Ok(Json(case.into()))
}

/// GET /cases/{id}
pub async fn read_case<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<CaseId>,
) -> CaseResult<Json<CaseResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let case = state.cases().get(ctx.principal(), id).await?;
    Ok(Json(case.into()))
}

/// PUT /cases/{id}
pub async fn update_case<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<CaseId>,
    Json(req): Json<UpdateCaseRequest>,
) -> CaseResult<Json<CaseResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let case = state.cases().update(ctx.principal(), id, req.into()).await?;
    Ok(Json(case.into()))
}

/// DELETE /cases/{id}
pub async fn delete_case<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<CaseId>,
) -> CaseResult<Json<CaseResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let case = state.cases().delete(ctx.principal(), id).await?;
    Ok(Json(case.into()))
}

// ============================================================================
// Documents
// ============================================================================

/// GET /cases/{id}/documents
pub async fn list_documents<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(case_id): Path<CaseId>,
    Query(page): Query<Page>,
) -> CaseResult<Json<Vec<DocumentResponse>>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let documents = state
        .documents()
        .list(ctx.principal(), case_id, page)
        .await?;
    Ok(Json(documents.into_iter().map(DocumentResponse::from).collect()))
}

/// POST /cases/{id}/documents
///
/// Multipart fields: `file` (required), `description`, `metadata` (JSON
/// object as text). Access and the case are checked before the body is read.
pub async fn upload_document<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(case_id): Path<CaseId>,
    mut multipart: Multipart,
) -> CaseResult<Json<DocumentResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let use_case = state.ingest();

    let permit = use_case.authorize(ctx.principal(), case_id).await?;
    let upload = read_upload(&mut multipart, use_case.max_upload_bytes()).await?;
    let document = use_case.execute(permit, upload).await?;

    Ok(Json(document.into()))
}

/// GET /documents/{id}
pub async fn read_document<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<DocumentId>,
) -> CaseResult<Json<DocumentResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let document = state.documents().get(ctx.principal(), id).await?;
    Ok(Json(document.into()))
}

/// GET /documents/{id}/download
pub async fn download_document<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<DocumentId>,
) -> CaseResult<Response>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let (document, data) = state.documents().download(ctx.principal(), id).await?;

    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    let headers = [
        (header::CONTENT_TYPE, document.file_type.mime().to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, data).into_response())
}

/// PUT /documents/{id}
pub async fn update_document<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<DocumentId>,
    Json(req): Json<UpdateDocumentRequest>,
) -> CaseResult<Json<DocumentResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let changes = DocumentChanges {
        filename: req.filename,
        description: req.description,
        metadata: req.document_metadata,
    };

    let document = state
        .documents()
        .update(ctx.principal(), id, changes)
        .await?;
    Ok(Json(document.into()))
}

/// DELETE /documents/{id}
pub async fn delete_document<R>(
    State(state): State<CasesAppState<R>>,
    ctx: RequestContext,
    Path(id): Path<DocumentId>,
) -> CaseResult<Json<DocumentResponse>>
where
    R: CaseRepository + DocumentRepository + Send + Sync + 'static,
{
    let document = state.documents().remove(ctx.principal(), id).await?;
    Ok(Json(document.into()))
}

// ============================================================================
// Multipart
// ============================================================================

fn multipart_error(e: MultipartError) -> CaseError {
    CaseError::InvalidUpload(format!("Multipart error: {e}"))
}

async fn read_upload(multipart: &mut Multipart, max_bytes: u64) -> CaseResult<Upload> {
    let mut upload = Upload::default();
    let mut has_file = false;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.filename = field.file_name().map(str::to_string);
                upload.content_type = field.content_type().map(str::to_string);
                upload.data = read_capped(&mut field, max_bytes).await?;
                has_file = true;
            }
            "description" => {
                upload.description = Some(field.text().await.map_err(multipart_error)?);
            }
            "metadata" => {
                upload.metadata = Some(field.text().await.map_err(multipart_error)?);
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    if !has_file {
        return Err(CaseError::InvalidUpload(
            "Missing 'file' field in multipart form".to_string(),
        ));
    }
    Ok(upload)
}

/// Read a field chunk by chunk, stopping once it is past `max_bytes`.
///
/// The returned buffer is then longer than the limit and the size check
/// rejects it; nothing beyond one extra chunk is buffered.
async fn read_capped(field: &mut Field<'_>, max_bytes: u64) -> CaseResult<Vec<u8>> {
    let mut data = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        data.extend_from_slice(&chunk);
        if data.len() as u64 > max_bytes {
            break;
        }
    }

    Ok(data)
}
