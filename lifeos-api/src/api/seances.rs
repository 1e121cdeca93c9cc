//! Workout log

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use lifeos_common::dates::parse_datetime;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Exercice, SeanceSport, SEANCE_TYPES, SPLIT_NAMES};
use crate::services::seeds;
use crate::validation::{AppJson, Validator};
use crate::{db, AppState};

const NOT_FOUND: &str = "Aucune séance trouvée avec cet ID";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeanceRequest {
    pub titre: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub split_name: Option<String>,
    pub duree_totale: Option<i64>,
    #[serde(default)]
    pub exercices: Vec<Exercice>,
    pub ressenti: Option<i64>,
    pub notes: Option<String>,
}

/// GET /api/seances-sport
pub async fn list_seances(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let seances = db::seances::list_seances(&state.db, &user.id).await?;
    Ok(Json(json!({
        "status": "success",
        "results": seances.len(),
        "data": { "seances": seances },
    })))
}

/// POST /api/seances-sport
pub async fn create_seance(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<SeanceRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let date = req.date.as_deref().map(parse_datetime);

    let mut v = Validator::new();
    v.require("titre", req.titre.as_deref(), "Le titre est requis")
        .present("type", req.kind.as_ref())
        .one_of("type", req.kind.as_deref(), &SEANCE_TYPES)
        .one_of("splitName", req.split_name.as_deref(), &SPLIT_NAMES)
        .in_range("ressenti", req.ressenti, 1, 10)
        .positive(
            "dureeTotale",
            req.duree_totale.map(|d| d as f64),
            "Number must be greater than 0",
        )
        .check(!matches!(date, Some(None)), "date", "Invalid datetime");
    for (i, exercice) in req.exercices.iter().enumerate() {
        v.check(
            !exercice.nom.trim().is_empty(),
            &format!("exercices.{}.nom", i),
            "Le nom est requis",
        );
    }
    v.finish()?;

    let now = Utc::now();
    let seance = SeanceSport {
        id: new_id(),
        user_id: user.id.clone(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        date: date.flatten().unwrap_or(now),
        kind: req.kind.unwrap_or_default(),
        split_name: req.split_name.unwrap_or_else(|| "OTHER".to_string()),
        duree_totale: req.duree_totale,
        exercices: req.exercices,
        ressenti: req.ressenti,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };
    db::seances::insert_seance(&state.db, &seance).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": { "seance": seance } })),
    ))
}

/// GET /api/seances-sport/:id
pub async fn get_seance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let seance = db::seances::load_seance(&state.db, &user.id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Json(json!({ "status": "success", "data": { "seance": seance } })))
}

/// DELETE /api/seances-sport/:id
pub async fn delete_seance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !db::seances::delete_seance(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/seances-sport/seed
pub async fn seed_seances(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let seances = seeds::demo_seances(&user.id, Utc::now());
    db::seances::replace_seances(&state.db, &user.id, &seances).await?;
    info!(user = %user.id, count = seances.len(), "Seeded demo workouts");
    Ok(Json(json!({
        "status": "success",
        "message": "PPL History Seeded",
        "results": seances.len(),
    })))
}

pub fn seance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/seances-sport", get(list_seances).post(create_seance))
        .route("/api/seances-sport/seed", post(seed_seances))
        .route("/api/seances-sport/:id", get(get_seance).delete(delete_seance))
}
