//! Value Objects

pub mod case_number;
pub mod content_type;

pub use case_number::CaseNumber;
pub use content_type::{ContentType, allowed_extensions};
