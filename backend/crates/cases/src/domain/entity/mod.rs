//! Domain Entities

pub mod case;
pub mod document;

pub use case::{Case, CaseDraft, CaseFields, CasePatch};
pub use document::{Document, Metadata, NewDocument};
