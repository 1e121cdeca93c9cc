//! Monthly income

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::depenses::PeriodQuery;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Revenu};
use crate::validation::{AppJson, AppQuery, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CreateRevenuRequest {
    pub libelle: Option<String>,
    pub montant: Option<f64>,
    pub mois: Option<i64>,
    pub annee: Option<i64>,
}

/// GET /api/revenus
pub async fn list_revenus(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResult<Json<Vec<Revenu>>> {
    let revenus = db::revenus::list_revenus(&state.db, &user.id, period.mois, period.annee).await?;
    Ok(Json(revenus))
}

/// POST /api/revenus
pub async fn create_revenu(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateRevenuRequest>,
) -> ApiResult<(StatusCode, Json<Revenu>)> {
    Validator::new()
        .require("libelle", req.libelle.as_deref(), "Le libellé est requis")
        .present("montant", req.montant.as_ref())
        .positive("montant", req.montant, "Le montant doit être positif")
        .present("mois", req.mois.as_ref())
        .in_range("mois", req.mois, 1, 12)
        .present("annee", req.annee.as_ref())
        .in_range("annee", req.annee, 2000, 2100)
        .finish()?;

    let revenu = Revenu {
        id: new_id(),
        user_id: user.id.clone(),
        libelle: req.libelle.unwrap_or_default().trim().to_string(),
        montant: req.montant.unwrap_or_default(),
        mois: req.mois.unwrap_or_default(),
        annee: req.annee.unwrap_or_default(),
        created_at: Utc::now(),
    };
    db::revenus::insert_revenu(&state.db, &revenu).await?;

    Ok((StatusCode::CREATED, Json(revenu)))
}

/// DELETE /api/revenus/:id
pub async fn delete_revenu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !db::revenus::delete_revenu(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound("Revenu introuvable".to_string()));
    }
    Ok(Json(json!({ "message": "Revenu supprimé" })))
}

pub fn revenu_routes() -> Router<AppState> {
    Router::new()
        .route("/api/revenus", get(list_revenus).post(create_revenu))
        .route("/api/revenus/:id", delete(delete_revenu))
}
