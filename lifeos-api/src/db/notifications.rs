//! Notification persistence

use lifeos_common::Result;
use sqlx::{types::Json, SqlitePool};

use crate::models::Notification;

pub async fn list_unread(pool: &SqlitePool, user_id: &str) -> Result<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = ? AND read = 0 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(notifications)
}

pub async fn insert_notification(pool: &SqlitePool, notification: &Notification) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, type, message, read, metadata, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(&notification.kind)
    .bind(&notification.message)
    .bind(notification.read)
    .bind(Json(&notification.metadata))
    .bind(notification.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// True when an unread notification of `kind` with the same period and alert type exists
pub async fn unread_alert_exists(
    pool: &SqlitePool,
    user_id: &str,
    kind: &str,
    mois: &str,
    annee: &str,
    alert_type: &str,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM notifications
            WHERE user_id = ? AND type = ? AND read = 0
              AND json_extract(metadata, '$.mois') = ?
              AND json_extract(metadata, '$.annee') = ?
              AND json_extract(metadata, '$.type') = ?
        )
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(mois)
    .bind(annee)
    .bind(alert_type)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// True when the notification exists for this user
pub async fn mark_read(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Number of notifications marked read
pub async fn mark_all_read(pool: &SqlitePool, user_id: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
