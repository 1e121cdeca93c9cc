//! Monthly income persistence

use lifeos_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::Revenu;

/// Income newest first, optionally restricted to a month and/or year
pub async fn list_revenus(
    pool: &SqlitePool,
    user_id: &str,
    mois: Option<i64>,
    annee: Option<i64>,
) -> Result<Vec<Revenu>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM revenus WHERE user_id = ");
    query.push_bind(user_id);
    if let Some(mois) = mois {
        query.push(" AND mois = ").push_bind(mois);
    }
    if let Some(annee) = annee {
        query.push(" AND annee = ").push_bind(annee);
    }
    query.push(" ORDER BY created_at DESC");

    let revenus = query.build_query_as::<Revenu>().fetch_all(pool).await?;
    Ok(revenus)
}

/// Income of any of the given `(mois, annee)` periods
pub async fn list_for_periods(
    pool: &SqlitePool,
    user_id: &str,
    periods: &[(u32, i32)],
) -> Result<Vec<Revenu>> {
    if periods.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM revenus WHERE user_id = ");
    query.push_bind(user_id).push(" AND (");
    let mut separated = query.separated(" OR ");
    for (mois, annee) in periods {
        separated
            .push("(mois = ")
            .push_bind_unseparated(*mois as i64)
            .push_unseparated(" AND annee = ")
            .push_bind_unseparated(*annee as i64)
            .push_unseparated(")");
    }
    query.push(") ORDER BY annee DESC, mois DESC, created_at DESC");

    let revenus = query.build_query_as::<Revenu>().fetch_all(pool).await?;
    Ok(revenus)
}

pub async fn insert_revenu(pool: &SqlitePool, revenu: &Revenu) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO revenus (id, user_id, libelle, montant, mois, annee, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&revenu.id)
    .bind(&revenu.user_id)
    .bind(&revenu.libelle)
    .bind(revenu.montant)
    .bind(revenu.mois)
    .bind(revenu.annee)
    .bind(revenu.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_revenu(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM revenus WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn total_for_month(pool: &SqlitePool, user_id: &str, mois: i64, annee: i64) -> Result<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(montant), 0.0) FROM revenus WHERE user_id = ? AND mois = ? AND annee = ?",
    )
    .bind(user_id)
    .bind(mois)
    .bind(annee)
    .fetch_one(pool)
    .await?;
    Ok(total)
}
