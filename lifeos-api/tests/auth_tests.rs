//! Registration, login, TOTP and route protection over HTTP

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use helpers::{TestApp, PASSWORD};
use lifeos_api::auth::{password, totp};
use serde_json::json;
use tower::util::ServiceExt;

#[tokio::test]
async fn test_register_then_me() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "ana@example.org");
    assert_eq!(body["data"]["twoFactorEnabled"], false);
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ana", "email": "not-an-email", "password": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("email: Please add a valid email"));
    assert!(message.contains("password: Password must be at least 6 characters"));

    app.register("ana@example.org").await;
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ana", "email": "ANA@example.org", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;
    app.register("ana@example.org").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.org", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app
        .send("POST", "/api/auth/login", None, Some(json!({ "email": "ana@example.org" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide an email and password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/api/depenses", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Not authorized to access this route");

    let (status, _) = app.get("/api/taches", "garbage.token.value").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_two_factor_login_flow() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app.post("/api/auth/2fa/generate", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let secret = body["secret"].as_str().unwrap().to_string();
    assert!(body["otpauthUrl"].as_str().unwrap().starts_with("otpauth://totp/LifeOS:"));

    let (status, _) = app.post("/api/auth/2fa/enable", &token, json!({ "code": "000000x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let now = Utc::now().timestamp() as u64;
    let code = totp::current_code(&secret, now).unwrap();
    let (status, body) = app.post("/api/auth/2fa/enable", &token, json!({ "code": code })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    // Password alone now yields a temporary token, not a session
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.org", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requires2FA"], true);
    assert!(body.get("token").is_none());
    let temp_token = body["tempToken"].as_str().unwrap().to_string();

    // The temporary token cannot be used as a session
    let (status, _) = app.get("/api/auth/me", &temp_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let code = totp::current_code(&secret, Utc::now().timestamp() as u64).unwrap();
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login/verify",
            None,
            Some(json!({ "tempToken": temp_token, "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let session = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/auth/me", &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["twoFactorEnabled"], true);
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "nobody@example.org" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "There is no user with that email");
}

#[tokio::test]
async fn test_reset_password_with_bad_token() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            "PUT",
            "/api/auth/reset-password/deadbeef",
            None,
            Some(json!({ "password": "another-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_password_reset_round_trip() {
    let app = TestApp::new().await;
    app.register("ana@example.org").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "ana@example.org" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": "Email sent" }));

    // Only the digest is stored
    let stored: Option<String> =
        sqlx::query_scalar("SELECT reset_password_token FROM users WHERE email = 'ana@example.org'")
            .fetch_one(&app.pool)
            .await
            .unwrap();
    let stored = stored.unwrap();
    assert_eq!(stored.len(), 64);
    assert!(stored.chars().all(|c| c.is_ascii_hexdigit()));

    // The mailed token only reaches the log; swap in one we know
    sqlx::query("UPDATE users SET reset_password_token = ? WHERE email = 'ana@example.org'")
        .bind(password::hash_reset_token("known-reset-token"))
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app
        .send(
            "PUT",
            "/api/auth/reset-password/known-reset-token",
            None,
            Some(json!({ "password": "nouveau-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some());

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.org", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.org", "password": "nouveau-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    // Single use
    let (status, body) = app
        .send(
            "PUT",
            "/api/auth/reset-password/known-reset-token",
            None,
            Some(json!({ "password": "encore-autre" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_enable_two_factor_rejections() {
    let app = TestApp::new().await;
    let token = app.register("ana@example.org").await;

    let (status, body) = app.post("/api/auth/2fa/enable", &token, json!({ "code": "123456" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Generate a 2FA secret first");

    let (_, body) = app.post("/api/auth/2fa/generate", &token, json!({})).await;
    let secret = body["secret"].as_str().unwrap().to_string();

    // A well-formed code that matches none of the accepted steps
    let now = Utc::now().timestamp() as u64;
    let accepted: Vec<String> = [now - totp::STEP_SECONDS, now, now + totp::STEP_SECONDS]
        .iter()
        .map(|t| totp::current_code(&secret, *t).unwrap())
        .collect();
    let wrong = (0..4u32)
        .map(|n| format!("{:06}", n * 111_111))
        .find(|code| !accepted.contains(code))
        .unwrap();

    let (status, body) = app.post("/api/auth/2fa/enable", &token, json!({ "code": wrong })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid 2FA code");

    let (_, body) = app.get("/api/auth/me", &token).await;
    assert_eq!(body["data"]["twoFactorEnabled"], false);
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": "Ana", "email": "ana@example.org", "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send_request(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@example.org");
}
