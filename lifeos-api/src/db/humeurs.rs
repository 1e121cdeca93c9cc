//! Mood journal persistence

use lifeos_common::Result;
use sqlx::{types::Json, SqlitePool};

use crate::models::Humeur;

pub async fn list_humeurs(pool: &SqlitePool, user_id: &str) -> Result<Vec<Humeur>> {
    let humeurs =
        sqlx::query_as::<_, Humeur>("SELECT * FROM humeurs WHERE user_id = ? ORDER BY date DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(humeurs)
}

/// Fails with a unique violation when the user already logged that day
pub async fn insert_humeur(pool: &SqlitePool, humeur: &Humeur) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO humeurs (id, user_id, date, niveau, tags, note) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&humeur.id)
    .bind(&humeur.user_id)
    .bind(humeur.date)
    .bind(humeur.niveau)
    .bind(Json(&humeur.tags))
    .bind(&humeur.note)
    .execute(pool)
    .await?;
    Ok(())
}
