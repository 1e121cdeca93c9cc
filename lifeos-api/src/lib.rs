//! lifeos-api library interface
//!
//! Exposes the router and application state so integration tests can drive the
//! service without binding a socket.

pub mod api;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod validation;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use chrono::{DateTime, Utc};
use lifeos_common::config::ServerConfig;
use sqlx::SqlitePool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::services::ai::GenerativeModel;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<ServerConfig>,
    /// Generative model behind every AI endpoint
    pub ai: Arc<dyn GenerativeModel>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: ServerConfig, ai: Arc<dyn GenerativeModel>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            ai,
            startup_time: Utc::now(),
        }
    }
}

/// Build the application router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(api::health_routes())
        .merge(api::auth_routes())
        .merge(api::account_routes())
        .merge(api::transaction_routes())
        .merge(api::depense_routes())
        .merge(api::revenu_routes())
        .merge(api::budget_routes())
        .merge(api::notification_routes())
        .merge(api::evenement_routes())
        .merge(api::template_routes())
        .merge(api::calendar_routes())
        .merge(api::recette_routes())
        .merge(api::planning_routes())
        .merge(api::liste_courses_routes())
        .merge(api::seance_routes())
        .merge(api::projet_routes())
        .merge(api::tache_routes())
        .merge(api::habitude_routes())
        .merge(api::humeur_routes())
        .merge(api::document_routes())
        .merge(api::ai_routes())
        .fallback(api::fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
