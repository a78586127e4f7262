//! Application Configuration
//!
//! Built once at startup and shared behind an `Arc`.

use std::path::PathBuf;

use auth::AccessPolicy;

/// Upload ceiling (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Room for multipart boundaries and the text fields next to the file
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CasesConfig {
    /// Same policy value the auth routes use
    pub policy: AccessPolicy,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl Default for CasesConfig {
    fn default() -> Self {
        Self {
            policy: AccessPolicy::default(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl CasesConfig {
    /// Request body limit for the upload route
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
            .unwrap_or(usize::MAX)
    }
}
