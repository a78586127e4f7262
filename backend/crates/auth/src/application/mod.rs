//! Application Layer
//!
//! Use cases and application services.

pub mod bootstrap;
pub mod config;
pub mod login;
pub mod manage_users;
mod password;
pub mod policy;
pub mod register;
pub mod resolve_principal;
pub mod token;

// Re-exports
pub use bootstrap::{EnsureSuperuserUseCase, Superuser};
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use manage_users::{AdminChanges, ManageUsersUseCase, ProfileChanges};
pub use policy::{AccessPolicy, Action, Decision, DocumentAccess};
pub use register::{RegisterInput, RegisterUseCase};
pub use resolve_principal::ResolvePrincipalUseCase;
pub use token::{TokenError, TokenService};
