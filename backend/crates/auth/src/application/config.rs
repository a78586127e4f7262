//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared behind an `Arc`; nothing here is read from globals afterwards.

use std::time::Duration;

use crate::application::policy::AccessPolicy;
use crate::application::token::TokenService;

/// Default bearer token lifetime (8 days)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(8 * 24 * 3600);

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 key for bearer tokens, any length. Rotating it
    /// invalidates every token.
    pub token_secret: Vec<u8>,
    pub token_ttl: Duration,
    /// Application-wide secret appended to passwords before hashing
    pub password_pepper: Option<Vec<u8>>,
    pub policy: AccessPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; 32],
            token_ttl: DEFAULT_TOKEN_TTL,
            password_pepper: None,
            policy: AccessPolicy::default(),
        }
    }
}

impl AuthConfig {
    /// Config with a secret generated for this process only
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    pub fn token_service(&self) -> TokenService {
        TokenService::new(&self.token_secret, self.token_ttl)
    }
}
