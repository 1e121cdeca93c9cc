//! Shared setup for the HTTP integration tests
//!
//! Each [`TestApp`] owns a fresh in-memory database, so tests never see each other's data.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use lifeos_api::services::ai::{AiError, DisabledModel, GenerativeModel, PromptPart};
use lifeos_api::{build_router, AppState};
use lifeos_common::config::{ConfigOverrides, ServerConfig};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "secret123";

/// Model that answers with canned replies, in order, then fails
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<Vec<PromptPart>>>,
}

impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(parts);
        self.replies.lock().unwrap().pop_front().ok_or(AiError::EmptyResponse)
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    /// App with AI disabled
    pub async fn new() -> Self {
        Self::build(Arc::new(DisabledModel), None).await
    }

    pub async fn with_model(model: Arc<dyn GenerativeModel>) -> Self {
        Self::build(model, None).await
    }

    pub async fn with_static_dir(dir: PathBuf) -> Self {
        Self::build(Arc::new(DisabledModel), Some(dir)).await
    }

    async fn build(ai: Arc<dyn GenerativeModel>, static_dir: Option<PathBuf>) -> Self {
        let pool = lifeos_common::db::connect_in_memory()
            .await
            .expect("in-memory database");
        let config = ServerConfig::resolve(
            ConfigOverrides {
                jwt_secret: Some(TEST_SECRET.to_string()),
                static_dir,
                ..Default::default()
            },
            None,
        )
        .expect("test configuration");

        let router = build_router(AppState::new(pool.clone(), config, ai));
        Self { router, pool }
    }

    /// Send a request; returns the status and the decoded JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PATCH", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    /// Register a user and return its session token
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "name": "Ana", "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }
}
