//! Bank account persistence

use lifeos_common::Result;
use sqlx::SqlitePool;

use crate::models::Account;

pub async fn list_accounts(pool: &SqlitePool, user_id: &str) -> Result<Vec<Account>> {
    let accounts =
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE user_id = ? ORDER BY created_at")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(accounts)
}

pub async fn load_account(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(account)
}

async fn insert_with<'e, E>(executor: E, account: &Account) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO accounts (id, user_id, name, type, balance, color, last_sync, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&account.id)
    .bind(&account.user_id)
    .bind(&account.name)
    .bind(&account.kind)
    .bind(account.balance)
    .bind(&account.color)
    .bind(account.last_sync)
    .bind(account.created_at)
    .bind(account.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_account(pool: &SqlitePool, account: &Account) -> Result<()> {
    insert_with(pool, account).await
}

pub async fn update_account(pool: &SqlitePool, account: &Account) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET name = ?, type = ?, balance = ?, color = ?, last_sync = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&account.name)
    .bind(&account.kind)
    .bind(account.balance)
    .bind(&account.color)
    .bind(account.last_sync)
    .bind(account.updated_at)
    .bind(&account.id)
    .bind(&account.user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Atomically swap every account of the user for `accounts`
///
/// Transactions of the removed accounts are kept; they list with `account: null`.
pub async fn replace_accounts(pool: &SqlitePool, user_id: &str, accounts: &[Account]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM accounts WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for account in accounts {
        insert_with(&mut *tx, account).await?;
    }

    tx.commit().await?;
    Ok(())
}
