//! Bank accounts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Account, ACCOUNT_TYPES, DEFAULT_ACCOUNT_COLOR};
use crate::services::seeds;
use crate::validation::{AppJson, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct AccountRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub balance: Option<f64>,
    pub color: Option<String>,
}

/// GET /api/accounts
pub async fn list_accounts(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let accounts = db::accounts::list_accounts(&state.db, &user.id).await?;
    Ok(Json(json!({
        "status": "success",
        "results": accounts.len(),
        "data": { "accounts": accounts },
    })))
}

/// POST /api/accounts
pub async fn create_account(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<AccountRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    Validator::new()
        .require("name", req.name.as_deref(), "An account must have a name")
        .one_of("type", req.kind.as_deref(), &ACCOUNT_TYPES)
        .finish()?;

    let now = Utc::now();
    let account = Account {
        id: new_id(),
        user_id: user.id.clone(),
        name: req.name.unwrap_or_default().trim().to_string(),
        kind: req.kind.unwrap_or_else(|| ACCOUNT_TYPES[0].to_string()),
        balance: req.balance.unwrap_or(0.0),
        color: req.color.unwrap_or_else(|| DEFAULT_ACCOUNT_COLOR.to_string()),
        last_sync: now,
        created_at: now,
        updated_at: now,
    };
    db::accounts::insert_account(&state.db, &account).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": { "account": account } })),
    ))
}

/// PATCH /api/accounts/:id
pub async fn update_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<AccountRequest>,
) -> ApiResult<Json<Value>> {
    Validator::new()
        .not_blank("name", req.name.as_deref(), "An account must have a name")
        .one_of("type", req.kind.as_deref(), &ACCOUNT_TYPES)
        .finish()?;

    let mut account = db::accounts::load_account(&state.db, &user.id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account found with that ID".to_string()))?;

    if let Some(name) = req.name {
        account.name = name.trim().to_string();
    }
    if let Some(kind) = req.kind {
        account.kind = kind;
    }
    if let Some(balance) = req.balance {
        account.balance = balance;
    }
    if let Some(color) = req.color {
        account.color = color;
    }
    account.updated_at = Utc::now();

    db::accounts::update_account(&state.db, &account).await?;
    Ok(Json(json!({ "status": "success", "data": { "account": account } })))
}

/// POST /api/accounts/sync
///
/// Replaces the caller's accounts with the demo bank snapshot.
pub async fn sync_accounts(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let accounts = seeds::demo_accounts(&user.id, Utc::now());
    db::accounts::replace_accounts(&state.db, &user.id, &accounts).await?;
    info!(user = %user.id, count = accounts.len(), "Accounts re-synced");

    Ok(Json(json!({
        "status": "success",
        "message": "Accounts re-synced with bank data",
        "data": { "accounts": accounts },
    })))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/accounts", get(list_accounts).post(create_account))
        .route("/api/accounts/sync", post(sync_accounts))
        .route("/api/accounts/:id", patch(update_account))
}
