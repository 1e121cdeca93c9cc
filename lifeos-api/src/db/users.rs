//! User persistence

use chrono::{DateTime, Utc};
use lifeos_common::Result;
use sqlx::SqlitePool;

use crate::models::UserRecord;

pub async fn insert_user(pool: &SqlitePool, user: &UserRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, two_factor_secret,
                           two_factor_enabled, reset_password_token, reset_password_expire, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(&user.two_factor_secret)
    .bind(user.two_factor_enabled)
    .bind(&user.reset_password_token)
    .bind(user.reset_password_expire)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_user(pool: &SqlitePool, id: &str) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Lookup by email, case-insensitive
pub async fn load_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// User holding an unexpired reset token whose SHA-256 hex digest is `token_hash`
pub async fn load_user_by_reset_token(
    pool: &SqlitePool,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>(
        "SELECT * FROM users WHERE reset_password_token = ? AND reset_password_expire > ?",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn set_reset_token(
    pool: &SqlitePool,
    id: &str,
    token_hash: &str,
    expire: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE users SET reset_password_token = ?, reset_password_expire = ? WHERE id = ?")
        .bind(token_hash)
        .bind(expire)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Store a new password hash and invalidate any pending reset token
pub async fn update_password(pool: &SqlitePool, id: &str, password_hash: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = ?, reset_password_token = NULL, reset_password_expire = NULL
        WHERE id = ?
        "#,
    )
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store a pending TOTP secret; two-factor stays in its current enabled state
pub async fn set_two_factor_secret(pool: &SqlitePool, id: &str, secret: &str) -> Result<()> {
    sqlx::query("UPDATE users SET two_factor_secret = ? WHERE id = ?")
        .bind(secret)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn enable_two_factor(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("UPDATE users SET two_factor_enabled = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
