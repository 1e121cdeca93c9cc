//! Shopping list persistence

use lifeos_common::Result;
use sqlx::{types::Json, SqlitePool};

use crate::models::ListeCourse;

/// Most recently generated list
pub async fn latest_liste(pool: &SqlitePool, user_id: &str) -> Result<Option<ListeCourse>> {
    let liste = sqlx::query_as::<_, ListeCourse>(
        r#"
        SELECT * FROM listes_courses WHERE user_id = ?
        ORDER BY date_generation DESC, created_at DESC LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(liste)
}

pub async fn load_liste(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<ListeCourse>> {
    let liste =
        sqlx::query_as::<_, ListeCourse>("SELECT * FROM listes_courses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(liste)
}

pub async fn insert_liste(pool: &SqlitePool, liste: &ListeCourse) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO listes_courses (id, user_id, items, date_generation, total_estime,
                                    source_planning_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&liste.id)
    .bind(&liste.user_id)
    .bind(Json(&liste.items))
    .bind(liste.date_generation)
    .bind(liste.total_estime)
    .bind(&liste.source_planning_id)
    .bind(liste.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_liste(pool: &SqlitePool, liste: &ListeCourse) -> Result<()> {
    sqlx::query("UPDATE listes_courses SET items = ?, total_estime = ? WHERE id = ? AND user_id = ?")
        .bind(Json(&liste.items))
        .bind(liste.total_estime)
        .bind(&liste.id)
        .bind(&liste.user_id)
        .execute(pool)
        .await?;
    Ok(())
}
