//! Monthly expense persistence

use lifeos_common::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::Depense;

/// Expenses newest first, optionally restricted to a month and/or year
pub async fn list_depenses(
    pool: &SqlitePool,
    user_id: &str,
    mois: Option<i64>,
    annee: Option<i64>,
) -> Result<Vec<Depense>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM depenses WHERE user_id = ");
    query.push_bind(user_id);
    if let Some(mois) = mois {
        query.push(" AND mois = ").push_bind(mois);
    }
    if let Some(annee) = annee {
        query.push(" AND annee = ").push_bind(annee);
    }
    query.push(" ORDER BY date DESC, created_at DESC");

    let depenses = query.build_query_as::<Depense>().fetch_all(pool).await?;
    Ok(depenses)
}

/// Expenses of any of the given `(mois, annee)` periods
pub async fn list_for_periods(
    pool: &SqlitePool,
    user_id: &str,
    periods: &[(u32, i32)],
) -> Result<Vec<Depense>> {
    if periods.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM depenses WHERE user_id = ");
    query.push_bind(user_id).push(" AND (");
    for (i, (mois, annee)) in periods.iter().enumerate() {
        if i > 0 {
            query.push(" OR ");
        }
        query
            .push("(mois = ")
            .push_bind(*mois as i64)
            .push(" AND annee = ")
            .push_bind(*annee as i64)
            .push(")");
    }
    query.push(") ORDER BY annee DESC, mois DESC, date DESC");

    let depenses = query.build_query_as::<Depense>().fetch_all(pool).await?;
    Ok(depenses)
}

pub async fn insert_depense(pool: &SqlitePool, depense: &Depense) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO depenses (id, user_id, libelle, montant, categorie, date, mois, annee, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&depense.id)
    .bind(&depense.user_id)
    .bind(&depense.libelle)
    .bind(depense.montant)
    .bind(&depense.categorie)
    .bind(depense.date)
    .bind(depense.mois)
    .bind(depense.annee)
    .bind(depense.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// True when a row was deleted
pub async fn delete_depense(pool: &SqlitePool, user_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM depenses WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn total_for_month(pool: &SqlitePool, user_id: &str, mois: i64, annee: i64) -> Result<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(montant), 0.0) FROM depenses WHERE user_id = ? AND mois = ? AND annee = ?",
    )
    .bind(user_id)
    .bind(mois)
    .bind(annee)
    .fetch_one(pool)
    .await?;
    Ok(total)
}
