//! Argon2 on the blocking pool
//!
//! Hashing and verifying take tens of milliseconds of CPU each, so they run
//! under `spawn_blocking` instead of on the request's worker thread.

use platform::password::{ClearTextPassword, HashedPassword, verify_absent};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

pub(crate) async fn hash_password(
    password: ClearTextPassword,
    config: &AuthConfig,
) -> AuthResult<HashedPassword> {
    let pepper = config.password_pepper.clone();

    tokio::task::spawn_blocking(move || password.hash(pepper.as_deref()))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
        .map_err(AuthError::from)
}

/// Check `password` against `stored`.
///
/// A missing account or a password rejected before lookup still pays for one
/// full verification, then reports a mismatch.
pub(crate) async fn verify_password(
    stored: Option<HashedPassword>,
    password: Option<ClearTextPassword>,
    config: &AuthConfig,
) -> AuthResult<bool> {
    let pepper = config.password_pepper.clone();

    tokio::task::spawn_blocking(move || match (&stored, &password) {
        (Some(stored), Some(password)) => stored.verify(password, pepper.as_deref()),
        _ => verify_absent(password.as_ref(), pepper.as_deref()),
    })
    .await
    .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(s: &str) -> ClearTextPassword {
        ClearTextPassword::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let config = AuthConfig {
            password_pepper: Some(b"pepper".to_vec()),
            ..AuthConfig::default()
        };

        let stored = hash_password(pw("pw123"), &config).await.unwrap();

        assert!(verify_password(Some(stored.clone()), Some(pw("pw123")), &config).await.unwrap());
        assert!(!verify_password(Some(stored.clone()), Some(pw("nope")), &config).await.unwrap());
        assert!(!verify_password(Some(stored), None, &config).await.unwrap());
        assert!(!verify_password(None, Some(pw("pw123")), &config).await.unwrap());
    }
}
