//! Calendar event persistence

use chrono::{DateTime, Utc};
use lifeos_common::Result;
use sqlx::SqlitePool;

use crate::models::Evenement;

pub async fn list_evenements(pool: &SqlitePool, user_id: &str) -> Result<Vec<Evenement>> {
    let evenements =
        sqlx::query_as::<_, Evenement>("SELECT * FROM evenements WHERE user_id = ? ORDER BY debut")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(evenements)
}

pub async fn load_evenement(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<Evenement>> {
    let evenement =
        sqlx::query_as::<_, Evenement>("SELECT * FROM evenements WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(evenement)
}

pub async fn load_by_ics_uid(pool: &SqlitePool, user_id: &str, uid: &str) -> Result<Option<Evenement>> {
    let evenement =
        sqlx::query_as::<_, Evenement>("SELECT * FROM evenements WHERE user_id = ? AND ics_uid = ?")
            .bind(user_id)
            .bind(uid)
            .fetch_optional(pool)
            .await?;
    Ok(evenement)
}

/// First event starting at or after `now`
pub async fn next_evenement(pool: &SqlitePool, user_id: &str, now: DateTime<Utc>) -> Result<Option<Evenement>> {
    let evenement = sqlx::query_as::<_, Evenement>(
        "SELECT * FROM evenements WHERE user_id = ? AND debut >= ? ORDER BY debut LIMIT 1",
    )
    .bind(user_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(evenement)
}

/// Events starting within `[start, end]`
pub async fn list_in_range(
    pool: &SqlitePool,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Evenement>> {
    let evenements = sqlx::query_as::<_, Evenement>(
        "SELECT * FROM evenements WHERE user_id = ? AND debut >= ? AND debut <= ? ORDER BY debut",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(evenements)
}

async fn insert_with<'e, E>(executor: E, evenement: &Evenement) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO evenements (id, user_id, titre, debut, fin, lieu, type, source,
                                template_id, ics_uid, couleur, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&evenement.id)
    .bind(&evenement.user_id)
    .bind(&evenement.titre)
    .bind(evenement.debut)
    .bind(evenement.fin)
    .bind(&evenement.lieu)
    .bind(&evenement.kind)
    .bind(&evenement.source)
    .bind(&evenement.template_id)
    .bind(&evenement.ics_uid)
    .bind(&evenement.couleur)
    .bind(evenement.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_evenement(pool: &SqlitePool, evenement: &Evenement) -> Result<()> {
    insert_with(pool, evenement).await
}

pub async fn update_evenement(pool: &SqlitePool, evenement: &Evenement) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE evenements
        SET titre = ?, debut = ?, fin = ?, lieu = ?, type = ?, source = ?,
            template_id = ?, ics_uid = ?, couleur = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&evenement.titre)
    .bind(evenement.debut)
    .bind(evenement.fin)
    .bind(&evenement.lieu)
    .bind(&evenement.kind)
    .bind(&evenement.source)
    .bind(&evenement.template_id)
    .bind(&evenement.ics_uid)
    .bind(&evenement.couleur)
    .bind(&evenement.id)
    .bind(&evenement.user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_evenement(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM evenements WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Atomically swap every event of the user for `evenements`
pub async fn replace_evenements(pool: &SqlitePool, user_id: &str, evenements: &[Evenement]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM evenements WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for evenement in evenements {
        insert_with(&mut *tx, evenement).await?;
    }

    tx.commit().await?;
    Ok(())
}
