//! Monthly expenses, receipt scanning

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use lifeos_common::dates::parse_datetime;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Depense};
use crate::services::ai::{generate_json, prompts, PromptPart, ReceiptScan};
use crate::services::budget_monitor;
use crate::validation::{AppJson, AppQuery, Validator};
use crate::{db, AppState};

const DEFAULT_CATEGORIE: &str = "Divers";
const SCAN_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// `?mois=&annee=` filter shared with the income and budget endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub mois: Option<i64>,
    pub annee: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateDepenseRequest {
    pub libelle: Option<String>,
    pub montant: Option<f64>,
    pub categorie: Option<String>,
    pub date: Option<String>,
    pub mois: Option<i64>,
    pub annee: Option<i64>,
}

/// GET /api/depenses
pub async fn list_depenses(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResult<Json<Vec<Depense>>> {
    let depenses = db::depenses::list_depenses(&state.db, &user.id, period.mois, period.annee).await?;
    Ok(Json(depenses))
}

/// POST /api/depenses
///
/// The budget check runs after the response is sent; its failures are only logged.
pub async fn create_depense(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateDepenseRequest>,
) -> ApiResult<(StatusCode, Json<Depense>)> {
    let date = req.date.as_deref().map(parse_datetime);

    Validator::new()
        .require("libelle", req.libelle.as_deref(), "Le libellé est requis")
        .present("montant", req.montant.as_ref())
        .positive("montant", req.montant, "Le montant doit être positif")
        .check(!matches!(date, Some(None)), "date", "Invalid datetime")
        .in_range("mois", req.mois, 1, 12)
        .in_range("annee", req.annee, 2000, 2100)
        .finish()?;

    let date = date.flatten().unwrap_or_else(Utc::now);
    let depense = Depense {
        id: new_id(),
        user_id: user.id.clone(),
        libelle: req.libelle.unwrap_or_default().trim().to_string(),
        montant: req.montant.unwrap_or_default(),
        categorie: req
            .categorie
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORIE.to_string()),
        date,
        mois: req.mois.unwrap_or(date.month() as i64),
        annee: req.annee.unwrap_or(date.year() as i64),
        created_at: Utc::now(),
    };
    db::depenses::insert_depense(&state.db, &depense).await?;

    let pool = state.db.clone();
    let (user_id, mois, annee) = (user.id.clone(), depense.mois, depense.annee);
    tokio::spawn(async move {
        if let Err(e) = budget_monitor::check_budget_health(&pool, &user_id, mois, annee).await {
            error!(user = %user_id, error = %e, "Budget check failed");
        }
    });

    Ok((StatusCode::CREATED, Json(depense)))
}

/// DELETE /api/depenses/:id
pub async fn delete_depense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !db::depenses::delete_depense(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound("Dépense introuvable".to_string()));
    }
    Ok(Json(json!({ "message": "Dépense supprimée" })))
}

/// POST /api/depenses/scan (multipart, `image` field)
pub async fn scan_ticket(
    State(state): State<AppState>,
    _user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut image: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let mime_type = field.content_type().unwrap_or("image/jpeg").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if !bytes.is_empty() {
            image = Some((mime_type, bytes.to_vec()));
        }
    }

    let (mime_type, data) =
        image.ok_or_else(|| ApiError::BadRequest("Veuillez fournir une image de ticket.".to_string()))?;

    let parts = vec![
        PromptPart::text(prompts::receipt_scan()),
        PromptPart::InlineImage { mime_type, data },
    ];
    let scan: ReceiptScan = generate_json(state.ai.as_ref(), parts).await.map_err(|e| {
        warn!(error = %e, "Receipt scan failed");
        ApiError::Internal("Impossible d'analyser le ticket.".to_string())
    })?;

    Ok(Json(json!({ "status": "success", "data": scan })))
}

pub fn depense_routes() -> Router<AppState> {
    Router::new()
        .route("/api/depenses", get(list_depenses).post(create_depense))
        .route(
            "/api/depenses/scan",
            post(scan_ticket).layer(DefaultBodyLimit::max(SCAN_BODY_LIMIT)),
        )
        .route("/api/depenses/:id", delete(delete_depense))
}
