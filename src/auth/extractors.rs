use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, error, warn};

use super::password::verify_password;
use crate::{error::ApiError, state::AppState};

const MISSING: &str = "Missing or invalid Authorization header";
const INVALID: &str = "Invalid admin credentials";

/// Verified against when the username is unknown, with the same argon2
/// parameters as real rows, so both rejections cost the same.
const UNKNOWN_ADMIN_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$NXh8CRqnG+7tDSu0Uc9a7g$qvTRthpLCRpciA1MVo/vDke9QM0OyRK0xBbSQp0ZZdY";

/// Gate for admin-only routes: HTTP Basic credentials, checked against the
/// credential store on every request. The username is recorded on the
/// `http_request` span as `admin`.
#[derive(Debug)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized(MISSING.into()))?;

        let (username, password) =
            parse_basic(header).ok_or_else(|| ApiError::Unauthorized(MISSING.into()))?;

        let stored = match state.credentials.find_by_username(&username).await {
            Ok(row) => row.map(|c| c.password_hash),
            Err(e) => {
                error!(error = %e, "credential lookup failed");
                return Err(ApiError::Internal("Internal server error".into()));
            }
        };
        let known = stored.is_some();

        match check_password(verify_password, &password, stored.as_deref()) {
            Ok(true) => {
                tracing::Span::current().record("admin", username.as_str());
                debug!(%username, "admin authenticated");
                Ok(AdminAuth)
            }
            Ok(false) => {
                if known {
                    warn!(%username, "admin password mismatch");
                } else {
                    warn!(%username, "unknown admin");
                }
                Err(ApiError::Unauthorized(INVALID.into()))
            }
            Err(e) => {
                error!(error = %e, %username, "stored admin hash unreadable");
                Err(ApiError::Internal("Internal server error".into()))
            }
        }
    }
}

/// Runs `verify` exactly once, against the stored hash or the unknown-admin
/// hash. An unknown admin never authenticates.
fn check_password<V>(verify: V, password: &str, stored: Option<&str>) -> anyhow::Result<bool>
where
    V: Fn(&str, &str) -> anyhow::Result<bool>,
{
    match stored {
        Some(hash) => verify(password, hash),
        None => verify(password, UNKNOWN_ADMIN_HASH).map(|_| false),
    }
}

/// Decode `Basic base64(user:pass)`; both parts must be non-empty.
fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    if user.is_empty() || pass.is_empty() {
        return None;
    }
    Some((user.to_string(), pass.to_string()))
}
