//! Domain Layer
//!
//! Contains entities, value objects and repository interfaces.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Case, CaseDraft, CaseFields, CasePatch, Document, Metadata, NewDocument};
pub use repository::{CaseRepository, DocumentRepository};
pub use value_object::{CaseNumber, ContentType};
