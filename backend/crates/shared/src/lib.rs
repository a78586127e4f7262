//! Shared Kernel - cross-domain vocabulary
//!
//! Only what every bounded context agrees on lives here:
//! - [`error`] - the unified [`AppError`](error::app_error::AppError) and its HTTP mapping
//! - [`id`] - typed integer identifiers for persisted records
//! - [`page`] - `skip`/`limit` pagination shared by all list endpoints

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod page;
