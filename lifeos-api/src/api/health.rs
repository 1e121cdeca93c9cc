//! Liveness endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "success", "message": "LifeOS API" }))
}

async fn api_root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "LifeOS API is running",
        "env": state.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": (chrono::Utc::now() - state.startup_time).num_seconds(),
    }))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api", get(api_root))
}
