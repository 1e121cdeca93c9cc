//! Project persistence

use lifeos_common::Result;
use sqlx::{types::Json, SqlitePool};

use crate::models::Projet;

pub async fn list_projets(pool: &SqlitePool, user_id: &str) -> Result<Vec<Projet>> {
    let projets =
        sqlx::query_as::<_, Projet>("SELECT * FROM projets WHERE user_id = ? ORDER BY date_debut DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(projets)
}

pub async fn list_active(pool: &SqlitePool, user_id: &str) -> Result<Vec<Projet>> {
    let projets = sqlx::query_as::<_, Projet>(
        "SELECT * FROM projets WHERE user_id = ? AND statut = 'actif' ORDER BY date_debut DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(projets)
}

pub async fn load_projet(pool: &SqlitePool, user_id: &str, id: &str) -> Result<Option<Projet>> {
    let projet = sqlx::query_as::<_, Projet>("SELECT * FROM projets WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(projet)
}

async fn insert_with<'e, E>(executor: E, projet: &Projet) -> Result<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO projets (id, user_id, titre, description, categorie, statut,
                             date_debut, date_fin_prevue, taches, couleur)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&projet.id)
    .bind(&projet.user_id)
    .bind(&projet.titre)
    .bind(&projet.description)
    .bind(&projet.categorie)
    .bind(&projet.statut)
    .bind(projet.date_debut)
    .bind(projet.date_fin_prevue)
    .bind(Json(&projet.taches))
    .bind(&projet.couleur)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_projet(pool: &SqlitePool, projet: &Projet) -> Result<()> {
    insert_with(pool, projet).await
}

pub async fn update_projet(pool: &SqlitePool, projet: &Projet) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE projets
        SET titre = ?, description = ?, categorie = ?, statut = ?, date_debut = ?,
            date_fin_prevue = ?, taches = ?, couleur = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&projet.titre)
    .bind(&projet.description)
    .bind(&projet.categorie)
    .bind(&projet.statut)
    .bind(projet.date_debut)
    .bind(projet.date_fin_prevue)
    .bind(Json(&projet.taches))
    .bind(&projet.couleur)
    .bind(&projet.id)
    .bind(&projet.user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_projet(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projets WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn replace_projets(pool: &SqlitePool, user_id: &str, projets: &[Projet]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM projets WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for projet in projets {
        insert_with(&mut *tx, projet).await?;
    }

    tx.commit().await?;
    Ok(())
}
