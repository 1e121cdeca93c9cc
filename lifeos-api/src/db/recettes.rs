//! Recipe persistence

use lifeos_common::Result;
use sqlx::{types::Json, QueryBuilder, Sqlite, SqlitePool};

use crate::models::Recette;

pub async fn list_recettes(pool: &SqlitePool, user_id: &str) -> Result<Vec<Recette>> {
    let recettes = sqlx::query_as::<_, Recette>(
        "SELECT * FROM recettes WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(recettes)
}

pub async fn load_recette(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<Recette>> {
    let recette = sqlx::query_as::<_, Recette>("SELECT * FROM recettes WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(recette)
}

/// Recipes of the user among `ids`; unknown ids are skipped
pub async fn load_many(pool: &SqlitePool, user_id: &str, ids: &[String]) -> Result<Vec<Recette>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM recettes WHERE user_id = ");
    query.push_bind(user_id);
    query.push(" AND id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let recettes = query.build_query_as::<Recette>().fetch_all(pool).await?;
    Ok(recettes)
}

async fn insert_with<'e, E>(executor: E, recette: &Recette) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO recettes (id, user_id, titre, type, image, ingredients, etapes,
                              duree_minutes, cuisson_minutes, calories, proteines, glucides,
                              lipides, is_favorite, last_cooked, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&recette.id)
    .bind(&recette.user_id)
    .bind(&recette.titre)
    .bind(&recette.kind)
    .bind(&recette.image)
    .bind(Json(&recette.ingredients))
    .bind(Json(&recette.etapes))
    .bind(recette.duree_minutes)
    .bind(recette.cuisson_minutes)
    .bind(recette.calories)
    .bind(recette.proteines)
    .bind(recette.glucides)
    .bind(recette.lipides)
    .bind(recette.is_favorite)
    .bind(recette.last_cooked)
    .bind(recette.created_at)
    .bind(recette.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_recette(pool: &SqlitePool, recette: &Recette) -> Result<()> {
    insert_with(pool, recette).await
}

pub async fn update_recette(pool: &SqlitePool, recette: &Recette) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE recettes
        SET titre = ?, type = ?, image = ?, ingredients = ?, etapes = ?, duree_minutes = ?,
            cuisson_minutes = ?, calories = ?, proteines = ?, glucides = ?, lipides = ?,
            is_favorite = ?, last_cooked = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&recette.titre)
    .bind(&recette.kind)
    .bind(&recette.image)
    .bind(Json(&recette.ingredients))
    .bind(Json(&recette.etapes))
    .bind(recette.duree_minutes)
    .bind(recette.cuisson_minutes)
    .bind(recette.calories)
    .bind(recette.proteines)
    .bind(recette.glucides)
    .bind(recette.lipides)
    .bind(recette.is_favorite)
    .bind(recette.last_cooked)
    .bind(recette.updated_at)
    .bind(&recette.id)
    .bind(&recette.user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_recette(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM recettes WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn replace_recettes(pool: &SqlitePool, user_id: &str, recettes: &[Recette]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM recettes WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for recette in recettes {
        insert_with(&mut *tx, recette).await?;
    }

    tx.commit().await?;
    Ok(())
}
