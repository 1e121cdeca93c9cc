//! Authenticated caller extractor
//!
//! Accepts `Authorization: Bearer <jwt>` or the `token` cookie set at login, and
//! resolves the token to an existing user.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::{db, error::ApiError, AppState};

pub const SESSION_COOKIE: &str = "token";

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// The user making the request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

        let claims = super::jwt::verify_session(&state.config.jwt_secret, &token).ok_or_else(|| {
            debug!("Rejected invalid or expired session token");
            ApiError::Unauthorized(NOT_AUTHORIZED.to_string())
        })?;

        let user = db::users::load_user(&state.db, &claims.id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))?;

        Ok(AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
