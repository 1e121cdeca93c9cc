//! Weekly meal plans

use axum::{extract::State, routing::get, Json, Router};
use chrono::{NaiveDate, Utc};
use lifeos_common::dates::{parse_date, week_start};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, PlanningSemaine, PopulatedPlanning, PopulatedSlot, Slot};
use crate::validation::{AppJson, AppQuery, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct PlanningQuery {
    /// Any day of the wanted week
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInput {
    pub jour: Option<i64>,
    pub recette_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanningRequest {
    pub date_debut: Option<String>,
    pub slots: Option<Vec<SlotInput>>,
}

/// Monday of the week containing `raw`, or of the current week
pub(crate) fn monday_of(field: &str, raw: Option<&str>) -> ApiResult<NaiveDate> {
    let date = match raw {
        Some(value) => parse_date(value)
            .ok_or_else(|| ApiError::Validation(vec![format!("{}: Invalid datetime", field)]))?,
        None => Utc::now().date_naive(),
    };
    Ok(week_start(date))
}

/// Resolve slot recipes; slots whose recipe is gone keep `null`
async fn populate(pool: &SqlitePool, planning: PlanningSemaine) -> ApiResult<PopulatedPlanning> {
    let ids: Vec<String> = planning.slots.iter().map(|s| s.recette_id.clone()).collect();
    let recettes = db::recettes::load_many(pool, &planning.user_id, &ids).await?;

    let slots = planning
        .slots
        .into_iter()
        .map(|slot| PopulatedSlot {
            jour: slot.jour,
            recette: recettes.iter().find(|r| r.id == slot.recette_id).cloned(),
        })
        .collect();

    Ok(PopulatedPlanning {
        id: planning.id,
        user_id: planning.user_id,
        date_debut: planning.date_debut,
        slots,
        created_at: planning.created_at,
    })
}

/// GET /api/planning-semaine?date=
///
/// An empty plan is created for weeks that have none yet.
pub async fn get_planning(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<PlanningQuery>,
) -> ApiResult<Json<PopulatedPlanning>> {
    let monday = monday_of("date", query.date.as_deref())?;

    let planning = match db::plannings::load_by_week(&state.db, &user.id, monday).await? {
        Some(planning) => planning,
        None => {
            let empty = PlanningSemaine {
                id: new_id(),
                user_id: user.id.clone(),
                date_debut: monday,
                slots: Vec::new(),
                created_at: Utc::now(),
            };
            db::plannings::upsert_planning(&state.db, &empty).await?
        }
    };

    Ok(Json(populate(&state.db, planning).await?))
}

/// PUT /api/planning-semaine
pub async fn update_planning(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<UpdatePlanningRequest>,
) -> ApiResult<Json<PopulatedPlanning>> {
    let mut v = Validator::new();
    v.present("slots", req.slots.as_ref());
    for (i, slot) in req.slots.iter().flatten().enumerate() {
        v.present(&format!("slots.{}.jour", i), slot.jour.as_ref())
            .in_range(&format!("slots.{}.jour", i), slot.jour, 0, 6)
            .require(
                &format!("slots.{}.recetteId", i),
                slot.recette_id.as_deref(),
                "L'ID de la recette est requis",
            );
    }
    v.finish()?;

    let monday = monday_of("dateDebut", req.date_debut.as_deref())?;
    let slots = req
        .slots
        .unwrap_or_default()
        .into_iter()
        .map(|slot| Slot {
            jour: slot.jour.unwrap_or_default() as u8,
            recette_id: slot.recette_id.unwrap_or_default(),
        })
        .collect();

    let planning = db::plannings::upsert_planning(
        &state.db,
        &PlanningSemaine {
            id: new_id(),
            user_id: user.id.clone(),
            date_debut: monday,
            slots,
            created_at: Utc::now(),
        },
    )
    .await?;

    Ok(Json(populate(&state.db, planning).await?))
}

pub fn planning_routes() -> Router<AppState> {
    Router::new().route("/api/planning-semaine", get(get_planning).put(update_planning))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monday_of_any_weekday() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();
        assert_eq!(monday_of("date", Some("2024-05-16")).unwrap(), expected);
        assert_eq!(monday_of("date", Some("2024-05-19T20:00:00Z")).unwrap(), expected);
        assert!(monday_of("date", Some("semaine 20")).is_err());
    }
}
