//! Server Configuration
//!
//! Everything the binary reads from the environment, parsed once at startup.
//! Component configs are derived from [`ApiConfig`] and never read env vars
//! themselves.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::application::Superuser;
use auth::{AccessPolicy, AuthConfig, DocumentAccess};
use cases::CasesConfig;
use cases::config::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_DIR};

const DEFAULT_DATABASE_URL: &str = "sqlite://database/legal_cases.db";
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8000";
/// 8 days
const DEFAULT_TOKEN_MINUTES: u64 = 60 * 24 * 8;
const MIN_SECRET_BYTES: usize = 32;

pub struct ApiConfig {
    pub database_url: String,
    pub http_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    /// `None` when `TOKEN_SECRET` is unset
    pub token_secret: Option<Vec<u8>>,
    pub token_ttl: Duration,
    pub password_pepper: Option<Vec<u8>>,
    pub superuser: Option<Superuser>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub policy: AccessPolicy,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_addr = var("HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("HTTP_ADDR must be host:port")?;

        let token_secret = var("TOKEN_SECRET").map(|s| parse_secret(&s)).transpose()?;

        let token_minutes = match var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a whole number")?,
            None => DEFAULT_TOKEN_MINUTES,
        };
        if token_minutes == 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be positive");
        }

        let superuser = match (
            var("FIRST_SUPERUSER"),
            var("FIRST_SUPERUSER_EMAIL"),
            var("FIRST_SUPERUSER_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(Superuser {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => bail!(
                "FIRST_SUPERUSER, FIRST_SUPERUSER_EMAIL and FIRST_SUPERUSER_PASSWORD must be set together"
            ),
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("MAX_UPLOAD_BYTES must be a whole number of bytes")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let enforce_roles = match var("ENFORCE_ROLES") {
            Some(v) => parse_bool(&v).context("ENFORCE_ROLES must be true or false")?,
            None => true,
        };

        let document_access = match var("DOCUMENT_ACCESS") {
            Some(v) => v.parse::<DocumentAccess>().map_err(anyhow::Error::msg)?,
            None => DocumentAccess::default(),
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            http_addr,
            cors_origins: var("BACKEND_CORS_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            token_secret,
            token_ttl: Duration::from_secs(token_minutes * 60),
            password_pepper: var("PASSWORD_PEPPER").map(String::into_bytes),
            superuser,
            upload_dir: PathBuf::from(
                var("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            max_upload_bytes,
            policy: AccessPolicy {
                enforce_roles,
                document_access,
            },
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        let base = match &self.token_secret {
            Some(token_secret) => AuthConfig {
                token_secret: token_secret.clone(),
                ..AuthConfig::default()
            },
            None => AuthConfig::with_random_secret(),
        };

        AuthConfig {
            token_ttl: self.token_ttl,
            password_pepper: self.password_pepper.clone(),
            policy: self.policy,
            ..base
        }
    }

    pub fn cases_config(&self) -> CasesConfig {
        CasesConfig {
            policy: self.policy,
            upload_dir: self.upload_dir.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Base64 secret of at least 32 bytes, kept whole as the HMAC key
fn parse_secret(raw: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = platform::crypto::from_base64(raw).context("TOKEN_SECRET must be base64")?;
    if bytes.len() < MIN_SECRET_BYTES {
        bail!("TOKEN_SECRET must decode to at least {MIN_SECRET_BYTES} bytes");
    }
    Ok(bytes)
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.http_addr.port(), 8000);
        assert_eq!(cfg.cors_origins.len(), 2);
        assert!(cfg.token_secret.is_none());
        assert_eq!(cfg.token_ttl, Duration::from_secs(8 * 24 * 3600));
        assert!(cfg.superuser.is_none());
        assert_eq!(cfg.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(cfg.policy, AccessPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let secret = platform::crypto::to_base64(&[7u8; 32]);
        let cfg = config(&[
            ("TOKEN_SECRET", secret.as_str()),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
            ("ENFORCE_ROLES", "false"),
            ("DOCUMENT_ACCESS", "case_roles"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("BACKEND_CORS_ORIGINS", "https://a.example, ,https://b.example"),
        ])
        .unwrap();

        assert_eq!(cfg.token_secret, Some(vec![7u8; 32]));
        assert_eq!(cfg.token_ttl, Duration::from_secs(30 * 60));
        assert!(!cfg.policy.enforce_roles);
        assert_eq!(cfg.policy.document_access, DocumentAccess::CaseRoles);
        assert_eq!(cfg.cases_config().max_upload_bytes, 1024);
        assert_eq!(cfg.cors_origins, ["https://a.example", "https://b.example"]);

        let auth = cfg.auth_config();
        assert_eq!(auth.token_secret, vec![7u8; 32]);
        assert_eq!(auth.policy, cfg.policy);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config(&[("TOKEN_SECRET", "c2hvcnQ=")]).is_err());
        assert!(config(&[("TOKEN_SECRET", "not base64!")]).is_err());
        assert!(config(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "0")]).is_err());
        assert!(config(&[("ENFORCE_ROLES", "maybe")]).is_err());
        assert!(config(&[("DOCUMENT_ACCESS", "public")]).is_err());
        assert!(config(&[("FIRST_SUPERUSER", "admin")]).is_err());
    }

    #[test]
    fn test_long_secret_is_kept_whole() {
        let long: Vec<u8> = (0..48u8).collect();
        let encoded = platform::crypto::to_base64(&long);
        let cfg = config(&[("TOKEN_SECRET", encoded.as_str())]).unwrap();

        assert_eq!(cfg.token_secret.as_deref(), Some(long.as_slice()));
        assert_eq!(cfg.auth_config().token_secret, long);
    }

    #[test]
    fn test_superuser_needs_all_three() {
        let cfg = config(&[
            ("FIRST_SUPERUSER", "admin"),
            ("FIRST_SUPERUSER_EMAIL", "admin@example.com"),
            ("FIRST_SUPERUSER_PASSWORD", "admin"),
        ])
        .unwrap();
        assert_eq!(cfg.superuser.unwrap().username, "admin");
    }
}
