//! Shared-password admin login.
//!
//! Tokens are `"<unix_ms>_<sha256_hex(password + unix_ms)>"` and stay valid
//! for 24 hours after issue.

use crate::error::AppError;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

pub const TOKEN_MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// Admin password as configured; `None` disables every admin route
#[derive(Debug, Clone, Default)]
pub struct AdminSecret(pub Option<Arc<str>>);

impl AdminSecret {
    pub fn new(password: Option<String>) -> Self {
        Self(password.map(Arc::from))
    }

    pub fn password(&self) -> Result<&str, AppError> {
        self.0.as_deref().ok_or_else(|| {
            AppError::Internal(
                "Admin authentication not configured. Please set SWING_ADMIN_PASSWORD environment variable."
                    .to_string(),
            )
        })
    }
}

fn digest(password: &str, timestamp: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(timestamp.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn issue_token(password: &str, now_ms: i64) -> String {
    let timestamp = now_ms.to_string();
    format!("{}_{}", timestamp, digest(password, &timestamp))
}

pub fn verify_token(token: &str, password: &str, now_ms: i64) -> bool {
    let Some((timestamp, hash)) = token.split_once('_') else {
        return false;
    };
    if timestamp.is_empty() || hash.is_empty() {
        return false;
    }

    let Ok(issued) = timestamp.parse::<i64>() else {
        return false;
    };
    if now_ms - issued > TOKEN_MAX_AGE_MS {
        return false;
    }

    digest(password, timestamp) == hash
}

/// Check a login attempt and mint a token
pub fn login(secret: &AdminSecret, password: Option<&str>) -> Result<String, AppError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;
    let expected = secret.password()?;

    if password != expected {
        warn!("Invalid admin password attempt");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    Ok(issue_token(password, Utc::now().timestamp_millis()))
}

/// Check a token presented to /api/admin/verify
pub fn check(secret: &AdminSecret, token: Option<&str>) -> Result<(), AppError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Token is required".to_string()))?;
    let password = secret.password()?;

    if verify_token(token, password, Utc::now().timestamp_millis()) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}

// -----------------------------------------------
// EXTRACTOR FOR MUTATING ROUTES
// -----------------------------------------------

/// Present only when the request carried a valid `Authorization: Bearer` token
#[derive(Debug, Clone)]
pub struct AdminToken(pub String);

impl<S> FromRequestParts<S> for AdminToken
where
    AdminSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = AdminSecret::from_ref(state);
        let password = secret.password()?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Missing admin token".to_string()))?;

        if !verify_token(token, password, Utc::now().timestamp_millis()) {
            return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
        }

        Ok(AdminToken(token.to_string()))
    }
}
