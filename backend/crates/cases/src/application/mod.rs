//! Application Layer
//!
//! Use cases and application services.

pub(crate) mod access;
pub mod config;
pub mod ingest_document;
pub mod manage_cases;
pub mod manage_documents;
pub mod reconcile;

// Re-exports
pub use config::CasesConfig;
pub use ingest_document::{IngestDocumentUseCase, Upload, UploadPermit, parse_metadata};
pub use manage_cases::ManageCasesUseCase;
pub use manage_documents::{DocumentChanges, ManageDocumentsUseCase};
pub use reconcile::{ReconcileReport, ReconcileStorageUseCase};
