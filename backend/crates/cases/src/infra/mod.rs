//! Infrastructure Layer
//!
//! SQLite repositories and the upload directory.

pub mod sqlite;
pub mod store;
