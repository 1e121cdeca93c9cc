//! Registration, login (with optional TOTP second factor), password reset

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{jwt, password, totp, AuthUser, SESSION_COOKIE};
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::models::{new_id, PublicUser, UserRecord, UserSummary};
use crate::validation::{is_valid_email, AppJson, Validator};
use crate::{db, AppState};

const RESET_TOKEN_BYTES: usize = 20;
const RESET_TOKEN_MINUTES: i64 = 10;
const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLoginRequest {
    pub temp_token: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnableTwoFactorRequest {
    pub code: Option<String>,
}

fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn password_rule(v: &mut Validator, value: Option<&str>) {
    v.check(
        value.map(|p| p.chars().count() >= password::MIN_PASSWORD_LENGTH).unwrap_or(false),
        "password",
        "Password must be at least 6 characters",
    );
}

/// Session cookie + `{success, token, user}` body
fn token_response(state: &AppState, status: StatusCode, user: &UserRecord) -> ApiResult<Response> {
    let token = jwt::sign_session(&state.config.jwt_secret, &user.id, state.config.jwt_expire_days)
        .map_err(|e| anyhow::anyhow!("Failed to sign session token: {}", e))?;

    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_COOKIE,
        token,
        state.config.jwt_expire_days * 24 * 60 * 60
    );
    if state.config.cookie_secure {
        cookie.push_str("; Secure");
    }

    let body = json!({
        "success": true,
        "token": token,
        "user": UserSummary::from(user),
    });
    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> ApiResult<Response> {
    let mut v = Validator::new();
    v.require("name", req.name.as_deref(), "Please add a name")
        .require("email", req.email.as_deref(), "Please add an email");
    if let Some(email) = req.email.as_deref().filter(|e| !e.trim().is_empty()) {
        v.check(is_valid_email(email.trim()), "email", "Please add a valid email");
    }
    password_rule(&mut v, req.password.as_deref());
    v.finish()?;

    let (Some(name), Some(email), Some(plain)) = (req.name, req.email, req.password) else {
        return Err(ApiError::BadRequest("Please provide name, email and password".to_string()));
    };
    let email = email.trim().to_lowercase();

    if db::users::load_user_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let user = UserRecord {
        id: new_id(),
        name: name.trim().to_string(),
        email,
        password_hash: password::hash_password(&plain)?,
        role: DEFAULT_ROLE.to_string(),
        two_factor_secret: None,
        two_factor_enabled: false,
        reset_password_token: None,
        reset_password_expire: None,
        created_at: Utc::now(),
    };

    match db::users::insert_user(&state.db, &user).await {
        Ok(()) => {}
        Err(lifeos_common::Error::Database(ref e)) if is_unique_violation(e) => {
            return Err(ApiError::BadRequest("User already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    info!(user = %user.id, "User registered");
    token_response(&state, StatusCode::CREATED, &user)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Response> {
    let (Some(email), Some(plain)) = (
        req.email.filter(|e| !e.trim().is_empty()),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Please provide an email and password".to_string()));
    };

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = db::users::load_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&plain, &user.password_hash) {
        warn!(user = %user.id, "Failed login attempt");
        return Err(invalid());
    }

    if user.two_factor_enabled {
        let temp_token = jwt::sign_two_factor(&state.config.jwt_secret, &user.id)
            .map_err(|e| anyhow::anyhow!("Failed to sign 2FA token: {}", e))?;
        return Ok(Json(json!({
            "success": true,
            "requires2FA": true,
            "tempToken": temp_token,
        }))
        .into_response());
    }

    token_response(&state, StatusCode::OK, &user)
}

/// POST /api/auth/login/verify
pub async fn verify_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<VerifyLoginRequest>,
) -> ApiResult<Response> {
    let (Some(temp_token), Some(code)) = (req.temp_token, req.code) else {
        return Err(ApiError::BadRequest("Please provide the temporary token and the code".to_string()));
    };

    let claims = jwt::verify_two_factor(&state.config.jwt_secret, &temp_token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    let user = db::users::load_user(&state.db, &claims.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    let valid = user
        .two_factor_secret
        .as_deref()
        .map(|secret| totp::verify_code(secret, &code, unix_now()))
        .unwrap_or(false);
    if !valid {
        return Err(ApiError::Unauthorized("Invalid 2FA code".to_string()));
    }

    token_response(&state, StatusCode::OK, &user)
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<serde_json::Value>> {
    let record = db::users::load_user(&state.db, &user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": PublicUser::from(record) })))
}

/// POST /api/auth/forgot-password
///
/// Mail delivery is not wired; the reset link is written to the log.
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let email = req.email.unwrap_or_default();
    let user = db::users::load_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("There is no user with that email".to_string()))?;

    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let expire = Utc::now() + Duration::minutes(RESET_TOKEN_MINUTES);

    db::users::set_reset_token(&state.db, &user.id, &password::hash_reset_token(&token), expire).await?;

    let reset_url = format!(
        "{}/reset-password/{}",
        state.config.public_url.trim_end_matches('/'),
        token
    );
    info!(user = %user.id, reset_url = %reset_url, "Password reset requested");

    Ok(Json(json!({ "success": true, "data": "Email sent" })))
}

/// PUT /api/auth/reset-password/:resettoken
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> ApiResult<Response> {
    let token_hash = password::hash_reset_token(&reset_token);
    let user = db::users::load_user_by_reset_token(&state.db, &token_hash, Utc::now())
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid token".to_string()))?;

    let mut v = Validator::new();
    password_rule(&mut v, req.password.as_deref());
    v.finish()?;
    let plain = req.password.unwrap_or_default();

    let password_hash = password::hash_password(&plain)?;
    db::users::update_password(&state.db, &user.id, &password_hash).await?;
    info!(user = %user.id, "Password reset");

    let user = db::users::load_user(&state.db, &user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    token_response(&state, StatusCode::OK, &user)
}

/// POST /api/auth/2fa/generate
pub async fn generate_two_factor(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let record = db::users::load_user(&state.db, &user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    if record.two_factor_enabled {
        return Err(ApiError::BadRequest("2FA is already enabled".to_string()));
    }

    let secret = totp::generate_secret();
    db::users::set_two_factor_secret(&state.db, &user.id, &secret).await?;

    let otpauth_url = totp::otpauth_url(&secret, &user.email);
    Ok(Json(json!({ "secret": secret, "otpauthUrl": otpauth_url })))
}

/// POST /api/auth/2fa/enable
pub async fn enable_two_factor(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<EnableTwoFactorRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let record = db::users::load_user(&state.db, &user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let secret = record
        .two_factor_secret
        .ok_or_else(|| ApiError::BadRequest("Generate a 2FA secret first".to_string()))?;

    let code = req.code.unwrap_or_default();
    if !totp::verify_code(&secret, &code, unix_now()) {
        return Err(ApiError::BadRequest("Invalid 2FA code".to_string()));
    }

    db::users::enable_two_factor(&state.db, &user.id).await?;
    info!(user = %user.id, "2FA enabled");
    Ok(Json(json!({ "success": true, "message": "2FA enabled" })))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/login/verify", post(verify_login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password/:resettoken", put(reset_password))
        .route("/api/auth/2fa/generate", post(generate_two_factor))
        .route("/api/auth/2fa/enable", post(enable_two_factor))
}
