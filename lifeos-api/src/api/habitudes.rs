//! Habit tracking

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use lifeos_common::dates::parse_date;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Habitude, HabitudeView, DEFAULT_HABITUDE_COLOR, HABITUDE_FREQUENCES};
use crate::validation::{AppJson, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CreateHabitudeRequest {
    pub titre: Option<String>,
    pub frequence: Option<String>,
    pub objectif: Option<f64>,
    pub unite: Option<String>,
    pub couleur: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    pub date: Option<String>,
    pub valeur: Option<f64>,
}

fn view(habitude: Habitude) -> HabitudeView {
    let streak = habitude.streak(Utc::now().date_naive());
    HabitudeView { habitude, streak }
}

/// GET /api/habitudes
pub async fn list_habitudes(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<HabitudeView>>> {
    let habitudes = db::habitudes::list_habitudes(&state.db, &user.id).await?;
    Ok(Json(habitudes.into_iter().map(view).collect()))
}

/// POST /api/habitudes
pub async fn create_habitude(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateHabitudeRequest>,
) -> ApiResult<(StatusCode, Json<HabitudeView>)> {
    Validator::new()
        .require("titre", req.titre.as_deref(), "Le titre est requis")
        .one_of("frequence", req.frequence.as_deref(), &HABITUDE_FREQUENCES)
        .check(
            req.objectif.map(|o| o >= 1.0 && o.is_finite()).unwrap_or(true),
            "objectif",
            "Number must be greater than or equal to 1",
        )
        .finish()?;

    let habitude = Habitude {
        id: new_id(),
        user_id: user.id.clone(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        frequence: req.frequence.unwrap_or_else(|| "quotidien".to_string()),
        objectif: req.objectif.unwrap_or(1.0),
        unite: req.unite,
        historique: Vec::new(),
        couleur: req.couleur.unwrap_or_else(|| DEFAULT_HABITUDE_COLOR.to_string()),
        date_creation: Utc::now(),
    };
    db::habitudes::insert_habitude(&state.db, &habitude).await?;

    Ok((StatusCode::CREATED, Json(view(habitude))))
}

/// PATCH /api/habitudes/:id/check
///
/// Records `valeur` for the calendar day of `date` (default today), replacing any
/// earlier entry for that day.
pub async fn check_habitude(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<CheckRequest>,
) -> ApiResult<Json<HabitudeView>> {
    let date = req.date.as_deref().map(parse_date);
    Validator::new()
        .present("valeur", req.valeur.as_ref())
        .check(
            req.valeur.map(|v| v >= 0.0 && v.is_finite()).unwrap_or(true),
            "valeur",
            "Number must be greater than or equal to 0",
        )
        .check(!matches!(date, Some(None)), "date", "Invalid date")
        .finish()?;

    let mut habitude = db::habitudes::load_habitude(&state.db, &user.id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habitude introuvable".to_string()))?;

    let day = date.flatten().unwrap_or_else(|| Utc::now().date_naive());
    habitude.record(day, req.valeur.unwrap_or_default());
    db::habitudes::update_historique(&state.db, &habitude).await?;

    Ok(Json(view(habitude)))
}

pub fn habitude_routes() -> Router<AppState> {
    Router::new()
        .route("/api/habitudes", get(list_habitudes).post(create_habitude))
        .route("/api/habitudes/:id/check", patch(check_habitude))
}
