//! Cases Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - SQLite repositories and the document file store
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Case CRUD gated by the shared access policy
//! - Document upload with a MIME allow-list and a size ceiling
//! - Server-chosen storage paths, staged through temp files
//! - Document deletion that reports and remembers failed file removals
//! - Startup reconciliation of the upload tree

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::CasesConfig;
pub use application::{ReconcileReport, ReconcileStorageUseCase};
pub use error::{CaseError, CaseResult};
pub use infra::sqlite::SqliteCaseRepository;
pub use infra::store::DocumentStore;
pub use presentation::handlers::CasesAppState;
pub use presentation::router::cases_router;

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

#[cfg(test)]
mod tests;
