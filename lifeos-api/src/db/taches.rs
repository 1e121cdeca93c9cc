//! To-do item persistence

use chrono::{DateTime, Utc};
use lifeos_common::Result;
use sqlx::SqlitePool;

use crate::models::Tache;

pub async fn list_taches(pool: &SqlitePool, user_id: &str) -> Result<Vec<Tache>> {
    let taches =
        sqlx::query_as::<_, Tache>("SELECT * FROM taches WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(taches)
}

pub async fn load_tache(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<Tache>> {
    let tache = sqlx::query_as::<_, Tache>("SELECT * FROM taches WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(tache)
}

/// Unfinished tasks due within `[start, end]`
pub async fn list_open_due_in_range(
    pool: &SqlitePool,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Tache>> {
    let taches = sqlx::query_as::<_, Tache>(
        r#"
        SELECT * FROM taches
        WHERE user_id = ? AND terminee = 0
          AND date_echeance IS NOT NULL AND date_echeance >= ? AND date_echeance <= ?
        ORDER BY date_echeance
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(taches)
}

pub async fn insert_tache(pool: &SqlitePool, tache: &Tache) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO taches (id, user_id, titre, description, terminee, date_echeance, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tache.id)
    .bind(&tache.user_id)
    .bind(&tache.titre)
    .bind(&tache.description)
    .bind(tache.terminee)
    .bind(tache.date_echeance)
    .bind(tache.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_tache(pool: &SqlitePool, tache: &Tache) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE taches SET titre = ?, description = ?, terminee = ?, date_echeance = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&tache.titre)
    .bind(&tache.description)
    .bind(tache.terminee)
    .bind(tache.date_echeance)
    .bind(&tache.id)
    .bind(&tache.user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_tache(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM taches WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
