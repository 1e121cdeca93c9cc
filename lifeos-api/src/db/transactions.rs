//! Transaction persistence with balance bookkeeping

use chrono::{DateTime, Utc};
use lifeos_common::Result;
use sqlx::SqlitePool;

use crate::models::Transaction;

pub async fn list_transactions(pool: &SqlitePool, user_id: &str) -> Result<Vec<Transaction>> {
    let transactions = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE user_id = ? ORDER BY date DESC, created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(transactions)
}

pub async fn list_by_account(
    pool: &SqlitePool,
    user_id: &str,
    account_id: &str,
) -> Result<Vec<Transaction>> {
    let transactions = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT * FROM transactions
        WHERE user_id = ? AND account_id = ?
        ORDER BY date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(account_id)
    .fetch_all(pool)
    .await?;
    Ok(transactions)
}

/// Most recent transactions dated on or after `since`
pub async fn list_recent(
    pool: &SqlitePool,
    user_id: &str,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Transaction>> {
    let transactions = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE user_id = ? AND date >= ? ORDER BY date DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(transactions)
}

/// Insert `transaction` and apply it to its account's balance in one database transaction
///
/// Returns the new balance, or `None` (nothing written) when the account does not
/// belong to the transaction's user.
pub async fn insert_with_balance(pool: &SqlitePool, transaction: &Transaction) -> Result<Option<f64>> {
    let mut tx = pool.begin().await?;

    let balance: Option<f64> =
        sqlx::query_scalar("SELECT balance FROM accounts WHERE id = ? AND user_id = ?")
            .bind(&transaction.account_id)
            .bind(&transaction.user_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(balance) = balance else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query(
        r#"
        INSERT INTO transactions (id, user_id, account_id, title, amount, type, category, date,
                                  is_recurring, is_simulation, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.user_id)
    .bind(&transaction.account_id)
    .bind(&transaction.title)
    .bind(transaction.amount)
    .bind(&transaction.kind)
    .bind(&transaction.category)
    .bind(transaction.date)
    .bind(transaction.is_recurring)
    .bind(transaction.is_simulation)
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .execute(&mut *tx)
    .await?;

    let new_balance = balance + transaction.balance_delta();

    sqlx::query("UPDATE accounts SET balance = ?, updated_at = ? WHERE id = ?")
        .bind(new_balance)
        .bind(transaction.created_at)
        .bind(&transaction.account_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(new_balance))
}
