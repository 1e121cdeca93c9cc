//! Bank transactions; creating one moves the account balance

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use lifeos_common::dates::parse_datetime;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    new_id, Account, AccountRef, Transaction, TransactionWithAccount, TRANSACTION_CATEGORIES,
    TRANSACTION_TYPES,
};
use crate::validation::{AppJson, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub account_id: Option<String>,
    pub date: Option<String>,
    pub is_recurring: Option<bool>,
    pub is_simulation: Option<bool>,
}

fn with_accounts(transactions: Vec<Transaction>, accounts: &[Account]) -> Vec<TransactionWithAccount> {
    let by_id: HashMap<&str, &Account> = accounts.iter().map(|a| (a.id.as_str(), a)).collect();
    transactions
        .into_iter()
        .map(|transaction| {
            let account = by_id.get(transaction.account_id.as_str()).map(|a| AccountRef {
                id: a.id.clone(),
                name: a.name.clone(),
                color: a.color.clone(),
            });
            TransactionWithAccount { transaction, account }
        })
        .collect()
}

fn listing(transactions: Vec<TransactionWithAccount>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "results": transactions.len(),
        "data": { "transactions": transactions },
    }))
}

/// GET /api/transactions
pub async fn list_transactions(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let transactions = db::transactions::list_transactions(&state.db, &user.id).await?;
    let accounts = db::accounts::list_accounts(&state.db, &user.id).await?;
    Ok(listing(with_accounts(transactions, &accounts)))
}

/// GET /api/transactions/account/:accountId
pub async fn list_account_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let transactions = db::transactions::list_by_account(&state.db, &user.id, &account_id).await?;
    let accounts = db::accounts::list_accounts(&state.db, &user.id).await?;
    Ok(listing(with_accounts(transactions, &accounts)))
}

/// POST /api/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let date = match req.date.as_deref() {
        Some(raw) => Some(
            parse_datetime(raw).ok_or_else(|| ApiError::Validation(vec!["date: Invalid datetime".to_string()]))?,
        ),
        None => None,
    };

    Validator::new()
        .require("title", req.title.as_deref(), "A transaction must have a title")
        .present("amount", req.amount.as_ref())
        .positive("amount", req.amount, "Amount must be positive")
        .present("type", req.kind.as_ref())
        .one_of("type", req.kind.as_deref(), &TRANSACTION_TYPES)
        .present("category", req.category.as_ref())
        .one_of("category", req.category.as_deref(), &TRANSACTION_CATEGORIES)
        .require("accountId", req.account_id.as_deref(), "A transaction must belong to an account")
        .finish()?;

    let account_id = req.account_id.unwrap_or_default();
    if db::accounts::load_account(&state.db, &user.id, &account_id).await?.is_none() {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    let now = Utc::now();
    let transaction = Transaction {
        id: new_id(),
        user_id: user.id.clone(),
        account_id,
        title: req.title.unwrap_or_default().trim().to_string(),
        amount: req.amount.unwrap_or_default(),
        kind: req.kind.unwrap_or_default(),
        category: req.category.unwrap_or_default(),
        date: date.unwrap_or(now),
        is_recurring: req.is_recurring.unwrap_or(false),
        is_simulation: req.is_simulation.unwrap_or(false),
        created_at: now,
        updated_at: now,
    };

    let new_balance = db::transactions::insert_with_balance(&state.db, &transaction)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    info!(
        user = %user.id,
        account = %transaction.account_id,
        delta = transaction.balance_delta(),
        "Transaction recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "transaction": transaction, "newBalance": new_balance },
        })),
    ))
}

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/api/transactions", get(list_transactions).post(create_transaction))
        .route("/api/transactions/account/:accountId", get(list_account_transactions))
}
