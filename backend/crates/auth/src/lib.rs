//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Staff accounts with username + password, four roles
//! - Stateless HMAC-signed bearer tokens
//! - One access policy deciding every role check, shared with `cases`
//! - Per-request principal resolution middleware
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Token signature compared in constant time
//! - Deleted or deactivated users lose access on their next request

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::policy::{AccessPolicy, Action, Decision, DocumentAccess};
pub use domain::entity::Principal;
pub use error::{AuthError, AuthResult};
pub use infra::sqlite::SqliteUserRepository;
pub use presentation::handlers::AuthAppState;
pub use presentation::middleware::{RequestContext, resolve_request_context};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::sqlite::SqliteUserRepository as UserStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
