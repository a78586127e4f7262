//! Bearer Token Service
//!
//! Stateless, HMAC-SHA256 signed tokens:
//!
//! ```text
//! base64url(json({"sub": <user id>, "exp": <unix seconds>})) "." base64url(hmac)
//! ```
//!
//! The MAC covers the encoded payload segment exactly as transmitted.
//! Verification checks the MAC (constant time) before it looks at the payload,
//! then the expiry, and only then hands out the subject. Every failure is the
//! same [`TokenError::Invalid`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::digest::KeyInit;
use hmac::digest::generic_array::GenericArray;
use hmac::{Hmac, Mac};
use kernel::id::UserId;
use platform::crypto::{from_base64url, to_base64url};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 block size, the HMAC key width
const KEY_BLOCK: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Could not validate credentials")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    /// Secret already reduced to one HMAC key block
    key: [u8; KEY_BLOCK],
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Accepts a secret of any length. As in HMAC itself, a secret longer
    /// than one block is replaced by its SHA-256 digest and a shorter one is
    /// zero-padded.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut key = [0u8; KEY_BLOCK];
        if secret.len() > KEY_BLOCK {
            let digest = Sha256::digest(secret);
            key[..digest.len()].copy_from_slice(&digest);
        } else {
            key[..secret.len()].copy_from_slice(secret);
        }
        Self { key, ttl }
    }

    /// Issue a token for `subject` valid for the configured TTL
    pub fn issue(&self, subject: UserId) -> String {
        self.issue_at(subject, self.ttl, Utc::now())
    }

    pub fn issue_at(&self, subject: UserId, ttl: Duration, now: DateTime<Utc>) -> String {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: subject.as_i64(),
            exp: now.timestamp().saturating_add(ttl_secs),
        };

        // Serializing two integers cannot fail
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let payload_b64 = to_base64url(&payload);
        let signature = self.sign(payload_b64.as_bytes());

        format!("{}.{}", payload_b64, to_base64url(&signature))
    }

    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Invalid)?;
        let signature = from_base64url(signature_b64).map_err(|_| TokenError::Invalid)?;

        // (a) signature
        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature).map_err(|_| TokenError::Invalid)?;

        let payload = from_base64url(payload_b64).map_err(|_| TokenError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        // (b) expiry
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Invalid);
        }

        // (c) subject
        Ok(UserId::from_i64(claims.sub))
    }

    fn mac(&self) -> HmacSha256 {
        <HmacSha256 as KeyInit>::new(GenericArray::from_slice(&self.key))
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn service() -> TokenService {
        TokenService::new(&[7u8; 32], Duration::from_secs(3600))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let svc = service();
        let token = svc.issue(UserId::from_i64(42));
        assert_eq!(svc.verify(&token), Ok(UserId::from_i64(42)));
    }

    #[test]
    fn test_token_shape() {
        let token = service().issue_at(UserId::from_i64(1), Duration::from_secs(60), at(1_000));
        let (payload, sig) = token.split_once('.').unwrap();
        let claims: serde_json::Value =
            serde_json::from_slice(&from_base64url(payload).unwrap()).unwrap();
        assert_eq!(claims["sub"], 1);
        assert_eq!(claims["exp"], 1_060);
        assert_eq!(from_base64url(sig).unwrap().len(), 32);
    }

    #[test]
    fn test_expired_token_with_valid_signature_is_rejected() {
        let svc = service();
        let token = svc.issue_at(UserId::from_i64(5), Duration::from_secs(60), at(1_000));

        assert!(svc.verify_at(&token, at(1_059)).is_ok());
        assert_eq!(svc.verify_at(&token, at(1_060)), Err(TokenError::Invalid));
        assert_eq!(svc.verify_at(&token, at(9_999)), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let svc = service();
        let token = svc.issue(UserId::from_i64(5));
        let (_, sig) = token.split_once('.').unwrap();

        let forged_payload = to_base64url(br#"{"sub":1,"exp":99999999999}"#);
        let forged = format!("{forged_payload}.{sig}");
        assert_eq!(svc.verify(&forged), Err(TokenError::Invalid));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = service().issue(UserId::from_i64(5));
        let rotated = TokenService::new(&[8u8; 32], Duration::from_secs(3600));
        assert_eq!(rotated.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_key_block_matches_plain_hmac() {
        for secret in [vec![7u8; 32], vec![9u8; KEY_BLOCK], (0..100u8).collect::<Vec<_>>()] {
            let svc = TokenService::new(&secret, Duration::from_secs(3600));
            let mut reference = <HmacSha256 as Mac>::new_from_slice(&secret).unwrap();
            Mac::update(&mut reference, b"payload");
            assert_eq!(
                svc.sign(b"payload"),
                reference.finalize().into_bytes().to_vec(),
                "secret of {} bytes",
                secret.len()
            );
        }
    }

    #[test]
    fn test_long_secrets_are_not_truncated() {
        let mut a = vec![1u8; 100];
        let b = a.clone();
        a[99] = 2;

        let token = TokenService::new(&a, Duration::from_secs(3600)).issue(UserId::from_i64(1));
        let other = TokenService::new(&b, Duration::from_secs(3600));
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let svc = service();
        for token in ["", ".", "abc", "abc.def", "a.b.c", "!!!.???"] {
            assert_eq!(svc.verify(token), Err(TokenError::Invalid), "{token}");
        }
    }

    #[test]
    fn test_signed_garbage_payload_is_rejected() {
        let svc = service();
        let payload_b64 = to_base64url(b"not json");
        let sig = to_base64url(&svc.sign(payload_b64.as_bytes()));
        assert_eq!(
            svc.verify(&format!("{payload_b64}.{sig}")),
            Err(TokenError::Invalid)
        );
    }
}
