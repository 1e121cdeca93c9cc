//! Weekly event templates

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use lifeos_common::dates::{at_time, next_weekday_on_or_after, parse_date, parse_hh_mm};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Evenement, TemplateEvenement, DEFAULT_EVENT_TYPE};
use crate::validation::{is_hh_mm, is_yyyy_mm_dd, AppJson, JsonOrEmpty, Validator};
use crate::{db, AppState};

const NOT_FOUND: &str = "Template introuvable";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    pub titre: Option<String>,
    pub jour_semaine: Option<i64>,
    pub heure_debut: Option<String>,
    pub duree_minutes: Option<i64>,
    pub lieu: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreerEvenementRequest {
    pub date: Option<String>,
}

/// GET /api/templates-evenements
pub async fn list_templates(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<TemplateEvenement>>> {
    Ok(Json(db::templates::list_templates(&state.db, &user.id).await?))
}

/// POST /api/templates-evenements
pub async fn create_template(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<TemplateRequest>,
) -> ApiResult<(StatusCode, Json<TemplateEvenement>)> {
    let heure = req.heure_debut.as_deref().filter(|h| is_hh_mm(h)).and_then(parse_hh_mm);

    Validator::new()
        .require("titre", req.titre.as_deref(), "Le titre est requis")
        .present("jourSemaine", req.jour_semaine.as_ref())
        .in_range("jourSemaine", req.jour_semaine, 0, 6)
        .check(heure.is_some(), "heureDebut", "Format HH:MM requis")
        .present("dureeMinutes", req.duree_minutes.as_ref())
        .positive(
            "dureeMinutes",
            req.duree_minutes.map(|d| d as f64),
            "La durée doit être positive",
        )
        .finish()?;

    let template = TemplateEvenement {
        id: new_id(),
        user_id: user.id.clone(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        jour_semaine: req.jour_semaine.unwrap_or_default(),
        heure_debut: heure.map(|h| h.format("%H:%M").to_string()).unwrap_or_default(),
        duree_minutes: req.duree_minutes.unwrap_or_default(),
        lieu: req.lieu.unwrap_or_default(),
        kind: req.kind.unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
        created_at: Utc::now(),
    };
    db::templates::insert_template(&state.db, &template).await?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// POST /api/templates-evenements/:id/creer-evenement
///
/// Stamps the template onto the first matching weekday on or after `date` (default today).
pub async fn creer_evenement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonOrEmpty(req): JsonOrEmpty<CreerEvenementRequest>,
) -> ApiResult<(StatusCode, Json<Evenement>)> {
    let from = match req.date.as_deref() {
        Some(raw) => Some(raw)
            .filter(|d| is_yyyy_mm_dd(d))
            .and_then(parse_date)
            .ok_or_else(|| ApiError::Validation(vec!["date: Format YYYY-MM-DD requis".to_string()]))?,
        None => Utc::now().date_naive(),
    };

    let template = db::templates::load_template(&state.db, &user.id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let heure = parse_hh_mm(&template.heure_debut)
        .ok_or_else(|| ApiError::Internal(format!("Heure invalide pour le template {}", template.id)))?;
    let jour = next_weekday_on_or_after(from, template.jour_semaine as u32);
    let debut = at_time(jour, heure);

    let evenement = Evenement {
        id: new_id(),
        user_id: user.id.clone(),
        titre: template.titre.clone(),
        debut,
        fin: debut + Duration::minutes(template.duree_minutes),
        lieu: template.lieu.clone(),
        kind: template.kind.clone(),
        source: "template".to_string(),
        template_id: Some(template.id.clone()),
        ics_uid: None,
        couleur: None,
        created_at: Utc::now(),
    };
    db::evenements::insert_evenement(&state.db, &evenement).await?;

    Ok((StatusCode::CREATED, Json(evenement)))
}

/// DELETE /api/templates-evenements/:id
pub async fn delete_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !db::templates::delete_template(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    Ok(Json(json!({ "message": "Template supprimé" })))
}

pub fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/api/templates-evenements", get(list_templates).post(create_template))
        .route("/api/templates-evenements/:id", delete(delete_template))
        .route("/api/templates-evenements/:id/creer-evenement", post(creer_evenement))
}
