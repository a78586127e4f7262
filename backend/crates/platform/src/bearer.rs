//! Bearer Token Extraction
//!
//! Parses `Authorization: Bearer <token>` (RFC 6750, scheme is case-insensitive).

use axum::http::{HeaderMap, header};

/// Value for `WWW-Authenticate` on 401 responses
pub const WWW_AUTHENTICATE_BEARER: &str = "Bearer";

/// Extract the bearer token from request headers
///
/// Returns `None` when the header is missing, not valid ASCII, uses another
/// scheme or carries an empty token.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
