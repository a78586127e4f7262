//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Password hashing (Argon2id)
//! - Random secrets and Base64 helpers
//! - Bearer token header parsing

pub mod bearer;
pub mod crypto;
pub mod password;
