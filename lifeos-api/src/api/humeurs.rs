//! Mood journal, one entry per day

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use lifeos_common::dates::parse_date;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::models::{new_id, Humeur};
use crate::validation::{AppJson, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CreateHumeurRequest {
    pub date: Option<String>,
    pub niveau: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub note: Option<String>,
}

/// GET /api/humeurs
pub async fn list_humeurs(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Humeur>>> {
    Ok(Json(db::humeurs::list_humeurs(&state.db, &user.id).await?))
}

/// POST /api/humeurs
pub async fn create_humeur(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateHumeurRequest>,
) -> ApiResult<(StatusCode, Json<Humeur>)> {
    let date = req.date.as_deref().map(parse_date);
    Validator::new()
        .present("niveau", req.niveau.as_ref())
        .in_range("niveau", req.niveau, 1, 5)
        .check(!matches!(date, Some(None)), "date", "Invalid date")
        .finish()?;

    let humeur = Humeur {
        id: new_id(),
        user_id: user.id.clone(),
        date: date.flatten().unwrap_or_else(|| Utc::now().date_naive()),
        niveau: req.niveau.unwrap_or_default(),
        tags: req.tags,
        note: req.note,
    };

    match db::humeurs::insert_humeur(&state.db, &humeur).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(humeur))),
        Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(format!(
            "Une humeur est déjà enregistrée pour le {}",
            humeur.date
        ))),
        Err(e) => Err(e.into()),
    }
}

pub fn humeur_routes() -> Router<AppState> {
    Router::new().route("/api/humeurs", get(list_humeurs).post(create_humeur))
}
