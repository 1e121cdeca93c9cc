//! Administrative document persistence

use chrono::{DateTime, Utc};
use lifeos_common::Result;
use sqlx::SqlitePool;

use crate::models::Document;

pub async fn list_documents(pool: &SqlitePool, user_id: &str) -> Result<Vec<Document>> {
    let documents = sqlx::query_as::<_, Document>(
        "SELECT * FROM documents WHERE user_id = ? ORDER BY date_ajout DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(documents)
}

pub async fn insert_document(pool: &SqlitePool, document: &Document) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO documents (id, user_id, titre, categorie, date_expiration, chemin_fichier,
                               notes, date_ajout)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&document.id)
    .bind(&document.user_id)
    .bind(&document.titre)
    .bind(&document.categorie)
    .bind(document.date_expiration)
    .bind(&document.chemin_fichier)
    .bind(&document.notes)
    .bind(document.date_ajout)
    .execute(pool)
    .await?;
    Ok(())
}

/// Documents expiring within `[now, until]`, soonest first
pub async fn list_expiring(
    pool: &SqlitePool,
    user_id: &str,
    now: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<Document>> {
    let documents = sqlx::query_as::<_, Document>(
        r#"
        SELECT * FROM documents
        WHERE user_id = ? AND date_expiration IS NOT NULL
          AND date_expiration >= ? AND date_expiration <= ?
        ORDER BY date_expiration
        "#,
    )
    .bind(user_id)
    .bind(now)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(documents)
}
