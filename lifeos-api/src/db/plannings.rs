//! Weekly meal plan persistence
//!
//! One plan per user and week, keyed by the week's Monday.

use chrono::NaiveDate;
use lifeos_common::Result;
use sqlx::{types::Json, SqlitePool};

use crate::models::PlanningSemaine;

pub async fn load_by_week(pool: &SqlitePool, user_id: &str, monday: NaiveDate) -> Result<Option<PlanningSemaine>> {
    let planning = sqlx::query_as::<_, PlanningSemaine>(
        "SELECT * FROM plannings_semaine WHERE user_id = ? AND date_debut = ?",
    )
    .bind(user_id)
    .bind(monday)
    .fetch_optional(pool)
    .await?;
    Ok(planning)
}

/// Plans whose week starts within `[first, last]`
pub async fn list_between(
    pool: &SqlitePool,
    user_id: &str,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<Vec<PlanningSemaine>> {
    let plannings = sqlx::query_as::<_, PlanningSemaine>(
        r#"
        SELECT * FROM plannings_semaine
        WHERE user_id = ? AND date_debut >= ? AND date_debut <= ?
        ORDER BY date_debut
        "#,
    )
    .bind(user_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await?;
    Ok(plannings)
}

/// Insert the plan, or replace the slots of the existing plan for that week
///
/// Returns the stored plan.
pub async fn upsert_planning(pool: &SqlitePool, planning: &PlanningSemaine) -> Result<PlanningSemaine> {
    sqlx::query(
        r#"
        INSERT INTO plannings_semaine (id, user_id, date_debut, slots, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_id, date_debut) DO UPDATE SET slots = excluded.slots
        "#,
    )
    .bind(&planning.id)
    .bind(&planning.user_id)
    .bind(planning.date_debut)
    .bind(Json(&planning.slots))
    .bind(planning.created_at)
    .execute(pool)
    .await?;

    let stored = sqlx::query_as::<_, PlanningSemaine>(
        "SELECT * FROM plannings_semaine WHERE user_id = ? AND date_debut = ?",
    )
    .bind(&planning.user_id)
    .bind(planning.date_debut)
    .fetch_one(pool)
    .await?;
    Ok(stored)
}
