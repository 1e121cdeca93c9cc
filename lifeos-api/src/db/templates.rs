//! Weekly event template persistence

use lifeos_common::Result;
use sqlx::SqlitePool;

use crate::models::TemplateEvenement;

/// Ordered by weekday then start time (`heure_debut` is stored zero-padded)
pub async fn list_templates(pool: &SqlitePool, user_id: &str) -> Result<Vec<TemplateEvenement>> {
    let templates = sqlx::query_as::<_, TemplateEvenement>(
        "SELECT * FROM templates_evenements WHERE user_id = ? ORDER BY jour_semaine, heure_debut",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(templates)
}

pub async fn load_template(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<TemplateEvenement>> {
    let template = sqlx::query_as::<_, TemplateEvenement>(
        "SELECT * FROM templates_evenements WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(template)
}

pub async fn insert_template(pool: &SqlitePool, template: &TemplateEvenement) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO templates_evenements (id, user_id, titre, jour_semaine, heure_debut,
                                          duree_minutes, lieu, type, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&template.id)
    .bind(&template.user_id)
    .bind(&template.titre)
    .bind(template.jour_semaine)
    .bind(&template.heure_debut)
    .bind(template.duree_minutes)
    .bind(&template.lieu)
    .bind(&template.kind)
    .bind(template.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_template(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM templates_evenements WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
