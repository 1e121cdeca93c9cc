//! Calendar events, demo seeding and iCalendar import

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use lifeos_common::dates::parse_datetime;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Evenement, DEFAULT_EVENT_TYPE, EVENT_SOURCES};
use crate::services::{ics, seeds};
use crate::validation::{AppJson, Validator};
use crate::{db, AppState};

const NOT_FOUND: &str = "Aucun événement trouvé avec cet ID";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvenementRequest {
    pub titre: Option<String>,
    pub debut: Option<String>,
    pub fin: Option<String>,
    pub lieu: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub source: Option<String>,
    pub template_id: Option<String>,
    pub ics_uid: Option<String>,
    pub couleur: Option<String>,
}

/// Parsed `debut`/`fin`; `Some(None)` marks an unparseable value
struct Bounds {
    debut: Option<Option<DateTime<Utc>>>,
    fin: Option<Option<DateTime<Utc>>>,
}

impl EvenementRequest {
    fn bounds(&self) -> Bounds {
        Bounds {
            debut: self.debut.as_deref().map(parse_datetime),
            fin: self.fin.as_deref().map(parse_datetime),
        }
    }

    /// Field rules shared by create and update; `required` adds presence checks
    fn validate(&self, bounds: &Bounds, required: bool) -> ApiResult<()> {
        let mut v = Validator::new();
        if required {
            v.require("titre", self.titre.as_deref(), "Le titre est requis")
                .present("debut", self.debut.as_ref())
                .present("fin", self.fin.as_ref());
        } else {
            v.not_blank("titre", self.titre.as_deref(), "Le titre est requis");
        }
        v.check(!matches!(bounds.debut, Some(None)), "debut", "Invalid datetime")
            .check(!matches!(bounds.fin, Some(None)), "fin", "Invalid datetime")
            .one_of("source", self.source.as_deref(), &EVENT_SOURCES)
            .finish()
    }
}

fn check_order(debut: DateTime<Utc>, fin: DateTime<Utc>) -> ApiResult<()> {
    if fin < debut {
        return Err(ApiError::Validation(vec![
            "fin: La fin doit être postérieure au début".to_string(),
        ]));
    }
    Ok(())
}

/// GET /api/evenements
pub async fn list_evenements(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let evenements = db::evenements::list_evenements(&state.db, &user.id).await?;
    Ok(Json(json!({
        "status": "success",
        "results": evenements.len(),
        "data": { "evenements": evenements },
    })))
}

/// Validate a create request into a new record owned by `user_id`
pub(crate) fn new_evenement(user_id: &str, req: EvenementRequest) -> ApiResult<Evenement> {
    let bounds = req.bounds();
    req.validate(&bounds, true)?;

    let (debut, fin) = match (bounds.debut.flatten(), bounds.fin.flatten()) {
        (Some(debut), Some(fin)) => (debut, fin),
        _ => return Err(ApiError::BadRequest("debut et fin sont requis".to_string())),
    };
    check_order(debut, fin)?;

    Ok(Evenement {
        id: new_id(),
        user_id: user_id.to_string(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        debut,
        fin,
        lieu: req.lieu.unwrap_or_default(),
        kind: req.kind.unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
        source: req.source.unwrap_or_else(|| "manual".to_string()),
        template_id: req.template_id,
        ics_uid: req.ics_uid,
        couleur: req.couleur,
        created_at: Utc::now(),
    })
}

/// POST /api/evenements
pub async fn create_evenement(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<EvenementRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let evenement = new_evenement(&user.id, req)?;
    db::evenements::insert_evenement(&state.db, &evenement).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": { "evenement": evenement } })),
    ))
}

/// GET /api/evenements/prochain
pub async fn next_evenement(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let evenement = db::evenements::next_evenement(&state.db, &user.id, Utc::now()).await?;
    Ok(Json(json!({ "status": "success", "data": evenement })))
}

async fn load_or_404(state: &AppState, user: &AuthUser, id: &str) -> ApiResult<Evenement> {
    db::evenements::load_evenement(&state.db, &user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// GET /api/evenements/:id
pub async fn get_evenement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let evenement = load_or_404(&state, &user, &id).await?;
    Ok(Json(json!({ "status": "success", "data": { "evenement": evenement } })))
}

/// PUT /api/evenements/:id
pub async fn update_evenement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<EvenementRequest>,
) -> ApiResult<Json<Value>> {
    let bounds = req.bounds();
    req.validate(&bounds, false)?;

    let mut evenement = load_or_404(&state, &user, &id).await?;
    if let Some(titre) = req.titre {
        evenement.titre = titre.trim().to_string();
    }
    if let Some(debut) = bounds.debut.flatten() {
        evenement.debut = debut;
    }
    if let Some(fin) = bounds.fin.flatten() {
        evenement.fin = fin;
    }
    check_order(evenement.debut, evenement.fin)?;
    if let Some(lieu) = req.lieu {
        evenement.lieu = lieu;
    }
    if let Some(kind) = req.kind {
        evenement.kind = kind;
    }
    if let Some(source) = req.source {
        evenement.source = source;
    }
    if req.template_id.is_some() {
        evenement.template_id = req.template_id;
    }
    if req.ics_uid.is_some() {
        evenement.ics_uid = req.ics_uid;
    }
    if req.couleur.is_some() {
        evenement.couleur = req.couleur;
    }

    db::evenements::update_evenement(&state.db, &evenement).await?;
    Ok(Json(json!({ "status": "success", "data": { "evenement": evenement } })))
}

/// DELETE /api/evenements/:id
pub async fn delete_evenement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !db::evenements::delete_evenement(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/evenements/seed
pub async fn seed_evenements(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let evenements = seeds::demo_evenements(&user.id, Utc::now());
    db::evenements::replace_evenements(&state.db, &user.id, &evenements).await?;
    info!(user = %user.id, count = evenements.len(), "Seeded demo events");
    Ok(Json(json!({
        "status": "success",
        "message": "Events Seeded",
        "results": evenements.len(),
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportIcsRequest {
    pub ics: Option<String>,
}

/// POST /api/evenements/import-ics
///
/// Events carrying a UID replace the caller's event with the same `icsUid`;
/// the others are always created.
pub async fn import_ics(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<ImportIcsRequest>,
) -> ApiResult<Json<Value>> {
    Validator::new()
        .require("ics", req.ics.as_deref(), "Le contenu ICS est requis")
        .finish()?;

    let parsed = ics::parse_calendar(req.ics.as_deref().unwrap_or_default());
    let (mut created, mut updated) = (0usize, 0usize);

    for event in parsed.events {
        let existing = match event.uid.as_deref() {
            Some(uid) => db::evenements::load_by_ics_uid(&state.db, &user.id, uid).await?,
            None => None,
        };

        match existing {
            Some(mut evenement) => {
                evenement.titre = event.summary;
                evenement.debut = event.start;
                evenement.fin = event.end;
                evenement.lieu = event.location;
                evenement.source = "ics".to_string();
                db::evenements::update_evenement(&state.db, &evenement).await?;
                updated += 1;
            }
            None => {
                let evenement = Evenement {
                    id: new_id(),
                    user_id: user.id.clone(),
                    titre: event.summary,
                    debut: event.start,
                    fin: event.end,
                    lieu: event.location,
                    kind: DEFAULT_EVENT_TYPE.to_string(),
                    source: "ics".to_string(),
                    template_id: None,
                    ics_uid: event.uid,
                    couleur: None,
                    created_at: Utc::now(),
                };
                db::evenements::insert_evenement(&state.db, &evenement).await?;
                created += 1;
            }
        }
    }

    info!(user = %user.id, created, updated, skipped = parsed.skipped, "Imported iCalendar events");
    Ok(Json(json!({
        "status": "success",
        "results": { "created": created, "updated": updated, "skipped": parsed.skipped },
    })))
}

pub fn evenement_routes() -> Router<AppState> {
    Router::new()
        .route("/api/evenements", get(list_evenements).post(create_evenement))
        .route("/api/evenements/prochain", get(next_evenement))
        .route("/api/evenements/seed", post(seed_evenements))
        .route("/api/evenements/import-ics", post(import_ics))
        .route(
            "/api/evenements/:id",
            get(get_evenement).put(update_evenement).delete(delete_evenement),
        )
}
