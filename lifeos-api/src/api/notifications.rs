//! In-app notifications

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::Notification;
use crate::{db, AppState};

/// GET /api/notifications (unread only)
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(db::notifications::list_unread(&state.db, &user.id).await?))
}

/// PATCH /api/notifications/:id/read
pub async fn mark_as_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !db::notifications::mark_read(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound("Notification introuvable".to_string()));
    }
    Ok(Json(json!({ "status": "success" })))
}

/// POST /api/notifications/clear
pub async fn clear_all(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let cleared = db::notifications::mark_all_read(&state.db, &user.id).await?;
    Ok(Json(json!({ "status": "success", "results": cleared })))
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/clear", post(clear_all))
        .route("/api/notifications/:id/read", patch(mark_as_read))
}
