//! Monthly budget summary

use axum::{extract::State, routing::get, Json, Router};
use chrono::{Datelike, Utc};
use serde::Serialize;

use super::depenses::PeriodQuery;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::validation::{AppQuery, Validator};
use crate::{db, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMensuel {
    pub mois: i64,
    pub annee: i64,
    pub total_revenus: f64,
    pub total_depenses: f64,
    pub reste_a_vivre: f64,
    pub total_liste_courses: f64,
    /// `None` when no grocery spending is planned
    pub reste_apres_courses: Option<f64>,
}

impl BudgetMensuel {
    pub fn compute(mois: i64, annee: i64, total_revenus: f64, total_depenses: f64, total_liste_courses: f64) -> Self {
        let reste_a_vivre = total_revenus - total_depenses;
        Self {
            mois,
            annee,
            total_revenus,
            total_depenses,
            reste_a_vivre,
            total_liste_courses,
            reste_apres_courses: (total_liste_courses != 0.0).then(|| reste_a_vivre - total_liste_courses),
        }
    }
}

/// GET /api/budget/mensuel
pub async fn get_budget_mensuel(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResult<Json<BudgetMensuel>> {
    Validator::new()
        .in_range("mois", period.mois, 1, 12)
        .in_range("annee", period.annee, 2000, 2100)
        .finish()?;

    let today = Utc::now();
    let mois = period.mois.unwrap_or(today.month() as i64);
    let annee = period.annee.unwrap_or(today.year() as i64);

    let total_revenus = db::revenus::total_for_month(&state.db, &user.id, mois, annee).await?;
    let total_depenses = db::depenses::total_for_month(&state.db, &user.id, mois, annee).await?;
    let total_liste_courses = db::listes::latest_liste(&state.db, &user.id)
        .await?
        .map(|liste| liste.estimated_total())
        .unwrap_or(0.0);

    Ok(Json(BudgetMensuel::compute(
        mois,
        annee,
        total_revenus,
        total_depenses,
        total_liste_courses,
    )))
}

pub fn budget_routes() -> Router<AppState> {
    Router::new().route("/api/budget/mensuel", get(get_budget_mensuel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reste_apres_courses_only_with_groceries() {
        let b = BudgetMensuel::compute(5, 2024, 2000.0, 1200.0, 0.0);
        assert_eq!(b.reste_a_vivre, 800.0);
        assert!(b.reste_apres_courses.is_none());

        let b = BudgetMensuel::compute(5, 2024, 2000.0, 1200.0, 150.0);
        assert_eq!(b.reste_apres_courses, Some(650.0));
    }
}
