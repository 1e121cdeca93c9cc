//! Request body extraction and field validation
//!
//! Handlers take [`AppJson`] (or [`JsonOrEmpty`] when the body is optional) and
//! [`AppQuery`] so malformed input becomes a 400 in the common error shape, then run a
//! [`Validator`] over the decoded fields.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

use crate::error::{ApiError, ApiResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static HH_MM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern is valid")
});

static YYYY_MM_DD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_hh_mm(value: &str) -> bool {
    HH_MM_RE.is_match(value)
}

pub fn is_yyyy_mm_dd(value: &str) -> bool {
    YYYY_MM_DD_RE.is_match(value)
}

/// JSON body extractor reporting decode failures as [`ApiError::BadRequest`]
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Query string extractor reporting decode failures as [`ApiError::BadRequest`]
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// JSON body extractor that yields `T::default()` for an empty body
///
/// Does not require a `Content-Type` header, so bodiless POSTs are accepted.
pub struct JsonOrEmpty<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonOrEmpty<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonOrEmpty(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(JsonOrEmpty)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
    }
}

/// Field deserializer telling an explicit `null` (`Some(None)`) from an absent field (`None`)
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Collects `field: message` failures and reports them together
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless `ok`
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(format!("{}: {}", field, message));
        }
        self
    }

    /// Field must be present and not blank
    pub fn require(&mut self, field: &str, value: Option<&str>, message: &str) -> &mut Self {
        let ok = value.map(|v| !v.trim().is_empty()).unwrap_or(false);
        self.check(ok, field, message)
    }

    /// Field must be present
    pub fn present<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        self.check(value.is_some(), field, "Required")
    }

    /// When present, field must not be blank
    pub fn not_blank(&mut self, field: &str, value: Option<&str>, message: &str) -> &mut Self {
        match value {
            Some(v) => self.check(!v.trim().is_empty(), field, message),
            None => self,
        }
    }

    /// When present, field must be one of `allowed`
    pub fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) -> &mut Self {
        match value {
            Some(v) if !allowed.contains(&v) => {
                let message = format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    allowed
                        .iter()
                        .map(|a| format!("'{}'", a))
                        .collect::<Vec<_>>()
                        .join(" | "),
                    v
                );
                self.errors.push(format!("{}: {}", field, message));
                self
            }
            _ => self,
        }
    }

    /// When present, number must lie in `min..=max`
    pub fn in_range<T>(&mut self, field: &str, value: Option<T>, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        match value {
            Some(v) if v < min || v > max => {
                let message = format!("Must be between {} and {}", min, max);
                self.errors.push(format!("{}: {}", field, message));
                self
            }
            _ => self,
        }
    }

    /// When present, number must be strictly positive
    pub fn positive(&mut self, field: &str, value: Option<f64>, message: &str) -> &mut Self {
        match value {
            Some(v) => self.check(v > 0.0 && v.is_finite(), field, message),
            None => self,
        }
    }

    pub fn finish(&mut self) -> ApiResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_collects_in_order() {
        let result = Validator::new()
            .require("titre", Some("  "), "Le titre est requis")
            .positive("montant", Some(-3.0), "Le montant doit être positif")
            .in_range("mois", Some(13), 1, 12)
            .finish();

        match result {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        "titre: Le titre est requis".to_string(),
                        "montant: Le montant doit être positif".to_string(),
                        "mois: Must be between 1 and 12".to_string(),
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validator_absent_optional_fields_pass() {
        assert!(Validator::new()
            .positive("montant", None, "x")
            .one_of("type", None, &["a"])
            .in_range::<i64>("annee", None, 2000, 2100)
            .not_blank("titre", None, "x")
            .finish()
            .is_ok());
    }

    #[test]
    fn test_one_of_message() {
        let result = Validator::new()
            .one_of("type", Some("LOAN"), &["CREDIT", "DEBIT"])
            .finish();
        let err = result.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation Error: type: Invalid enum value. Expected 'CREDIT' | 'DEBIT', received 'LOAN'"
        );
    }

    #[test]
    fn test_patterns() {
        assert!(is_valid_email("ana@example.org"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana example@x.org"));

        assert!(is_hh_mm("9:05"));
        assert!(is_hh_mm("23:59"));
        assert!(!is_hh_mm("24:00"));
        assert!(!is_hh_mm("12:60"));

        assert!(is_yyyy_mm_dd("2024-05-13"));
        assert!(!is_yyyy_mm_dd("13/05/2024"));
    }
}
