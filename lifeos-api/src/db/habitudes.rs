//! Habit persistence

use lifeos_common::Result;
use sqlx::{types::Json, SqlitePool};

use crate::models::Habitude;

pub async fn list_habitudes(pool: &SqlitePool, user_id: &str) -> Result<Vec<Habitude>> {
    let habitudes = sqlx::query_as::<_, Habitude>(
        "SELECT * FROM habitudes WHERE user_id = ? ORDER BY date_creation DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(habitudes)
}

pub async fn load_habitude(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<Habitude>> {
    let habitude = sqlx::query_as::<_, Habitude>("SELECT * FROM habitudes WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(habitude)
}

pub async fn insert_habitude(pool: &SqlitePool, habitude: &Habitude) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO habitudes (id, user_id, titre, frequence, objectif, unite, historique,
                               couleur, date_creation)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&habitude.id)
    .bind(&habitude.user_id)
    .bind(&habitude.titre)
    .bind(&habitude.frequence)
    .bind(habitude.objectif)
    .bind(&habitude.unite)
    .bind(Json(&habitude.historique))
    .bind(&habitude.couleur)
    .bind(habitude.date_creation)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_historique(pool: &SqlitePool, habitude: &Habitude) -> Result<()> {
    sqlx::query("UPDATE habitudes SET historique = ? WHERE id = ? AND user_id = ?")
        .bind(Json(&habitude.historique))
        .bind(&habitude.id)
        .bind(&habitude.user_id)
        .execute(pool)
        .await?;
    Ok(())
}
