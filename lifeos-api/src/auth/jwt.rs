//! HS256 session tokens
//!
//! Session tokens carry `{id, iat, exp}`. The short-lived token issued between the
//! password and TOTP steps of a login additionally carries `purpose: "2fa"` and is
//! refused everywhere a session is expected.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of the intermediate two-factor token
pub const TWO_FACTOR_TOKEN_MINUTES: i64 = 5;

pub const TWO_FACTOR_PURPOSE: &str = "2fa";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

fn sign(secret: &str, id: &str, ttl: Duration, purpose: Option<&str>) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        id: id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        purpose: purpose.map(str::to_string),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Session token valid for `expire_days`
pub fn sign_session(secret: &str, user_id: &str, expire_days: i64) -> jsonwebtoken::errors::Result<String> {
    sign(secret, user_id, Duration::days(expire_days), None)
}

/// Intermediate token proving the password step of a two-factor login
pub fn sign_two_factor(secret: &str, user_id: &str) -> jsonwebtoken::errors::Result<String> {
    sign(
        secret,
        user_id,
        Duration::minutes(TWO_FACTOR_TOKEN_MINUTES),
        Some(TWO_FACTOR_PURPOSE),
    )
}

fn decode_claims(secret: &str, token: &str) -> Option<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .ok()
        .map(|data| data.claims)
}

/// Claims of a valid session token
pub fn verify_session(secret: &str, token: &str) -> Option<Claims> {
    decode_claims(secret, token).filter(|claims| claims.purpose.is_none())
}

/// Claims of a valid intermediate two-factor token
pub fn verify_two_factor(secret: &str, token: &str) -> Option<Claims> {
    decode_claims(secret, token)
        .filter(|claims| claims.purpose.as_deref() == Some(TWO_FACTOR_PURPOSE))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_session_token_verifies() {
        let token = sign_session(SECRET, "user-1", 30).unwrap();
        let claims = verify_session(SECRET, &token).unwrap();
        assert_eq!(claims.id, "user-1");
        assert!(claims.exp - claims.iat >= 30 * 24 * 3600 - 1);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_session(SECRET, "user-1", 30).unwrap();
        assert!(verify_session("other-secret", &token).is_none());
        assert!(verify_session(SECRET, "not-a-jwt").is_none());
    }

    #[test]
    fn test_token_purposes_do_not_mix() {
        let temp = sign_two_factor(SECRET, "user-1").unwrap();
        assert!(verify_session(SECRET, &temp).is_none());
        assert_eq!(verify_two_factor(SECRET, &temp).unwrap().id, "user-1");

        let session = sign_session(SECRET, "user-1", 1).unwrap();
        assert!(verify_two_factor(SECRET, &session).is_none());
    }
}
