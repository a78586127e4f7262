//! Cases Error Types
//!
//! Case and document error variants that render through the unified
//! `kernel::error::AppError` problem-details body. Access-policy failures are
//! carried as [`AuthError`] so 401 responses keep their challenge header.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::allowed_extensions;

/// Cases-specific result type alias
pub type CaseResult<T> = Result<T, CaseError>;

#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Case not found")]
    CaseNotFound,

    #[error("Document not found")]
    DocumentNotFound,

    #[error("Case number already registered")]
    CaseNumberTaken,

    #[error("File type not allowed. Allowed types: {}", allowed_extensions())]
    UnsupportedFileType { content_type: String },

    #[error("File too large. Maximum size allowed: {max_bytes} bytes")]
    FileTooLarge { max_bytes: u64 },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Malformed multipart body or missing `file` field
    #[error("{0}")]
    InvalidUpload(String),

    #[error("{0}")]
    Validation(String),

    /// Another document already owns the chosen storage path
    #[error("Storage path already in use")]
    PathTaken,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CaseError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CaseError::Auth(e) => e.kind(),
            CaseError::CaseNotFound | CaseError::DocumentNotFound => ErrorKind::NotFound,
            CaseError::CaseNumberTaken
            | CaseError::UnsupportedFileType { .. }
            | CaseError::FileTooLarge { .. }
            | CaseError::InvalidMetadata(_)
            | CaseError::InvalidUpload(_) => ErrorKind::BadRequest,
            CaseError::Validation(_) => ErrorKind::UnprocessableEntity,
            CaseError::PathTaken => ErrorKind::Conflict,
            CaseError::Storage(_) | CaseError::Database(_) | CaseError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError. Server-side details never reach the body.
    pub fn to_app_error(&self) -> AppError {
        match self {
            CaseError::Auth(e) => e.to_app_error(),
            CaseError::Storage(_)
            | CaseError::Database(_)
            | CaseError::Internal(_)
            | CaseError::PathTaken => AppError::internal("Internal server error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            CaseError::Storage(e) => {
                tracing::error!(error = %e, "Document storage error");
            }
            CaseError::Database(e) => {
                tracing::error!(error = %e, "Cases database error");
            }
            CaseError::Internal(msg) => {
                tracing::error!(message = %msg, "Cases internal error");
            }
            CaseError::PathTaken => {
                tracing::error!("Could not allocate a storage path");
            }
            CaseError::UnsupportedFileType { content_type } => {
                tracing::info!(content_type = %content_type, "Upload rejected: file type");
            }
            CaseError::FileTooLarge { max_bytes } => {
                tracing::info!(max_bytes, "Upload rejected: too large");
            }
            _ => {
                tracing::debug!(error = %self, "Cases error");
            }
        }
    }
}

impl IntoResponse for CaseError {
    fn into_response(self) -> Response {
        match self {
            CaseError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

impl From<AppError> for CaseError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                CaseError::Validation(err.message().to_string())
            }
            _ => CaseError::Internal(err.to_string()),
        }
    }
}
