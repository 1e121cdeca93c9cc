//! Workout session persistence

use chrono::{DateTime, Utc};
use lifeos_common::Result;
use sqlx::{types::Json, SqlitePool};

use crate::models::SeanceSport;

pub async fn list_seances(pool: &SqlitePool, user_id: &str) -> Result<Vec<SeanceSport>> {
    let seances =
        sqlx::query_as::<_, SeanceSport>("SELECT * FROM seances_sport WHERE user_id = ? ORDER BY date DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(seances)
}

pub async fn load_seance(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<SeanceSport>> {
    let seance =
        sqlx::query_as::<_, SeanceSport>("SELECT * FROM seances_sport WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(seance)
}

/// Most recent session, if any
pub async fn latest_seance(pool: &SqlitePool, user_id: &str) -> Result<Option<SeanceSport>> {
    let seance = sqlx::query_as::<_, SeanceSport>(
        "SELECT * FROM seances_sport WHERE user_id = ? ORDER BY date DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(seance)
}

pub async fn count_since(pool: &SqlitePool, user_id: &str, since: DateTime<Utc>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seances_sport WHERE user_id = ? AND date >= ?")
        .bind(user_id)
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Sessions dated within `[start, end]`
pub async fn list_in_range(
    pool: &SqlitePool,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<SeanceSport>> {
    let seances = sqlx::query_as::<_, SeanceSport>(
        "SELECT * FROM seances_sport WHERE user_id = ? AND date >= ? AND date <= ? ORDER BY date",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(seances)
}

async fn insert_with<'e, E>(executor: E, seance: &SeanceSport) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO seances_sport (id, user_id, titre, date, type, split_name, duree_totale,
                                   exercices, ressenti, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&seance.id)
    .bind(&seance.user_id)
    .bind(&seance.titre)
    .bind(seance.date)
    .bind(&seance.kind)
    .bind(&seance.split_name)
    .bind(seance.duree_totale)
    .bind(Json(&seance.exercices))
    .bind(seance.ressenti)
    .bind(&seance.notes)
    .bind(seance.created_at)
    .bind(seance.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_seance(pool: &SqlitePool, seance: &SeanceSport) -> Result<()> {
    insert_with(pool, seance).await
}

pub async fn delete_seance(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM seances_sport WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn replace_seances(pool: &SqlitePool, user_id: &str, seances: &[SeanceSport]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM seances_sport WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for seance in seances {
        insert_with(&mut *tx, seance).await?;
    }

    tx.commit().await?;
    Ok(())
}
