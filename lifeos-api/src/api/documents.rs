//! Administrative documents and expiry reminders

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{Duration, Utc};
use lifeos_common::dates::parse_datetime;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::models::{new_id, Document, DOCUMENT_CATEGORIES};
use crate::validation::{AppJson, AppQuery, Validator};
use crate::{db, AppState};

const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub titre: Option<String>,
    pub categorie: Option<String>,
    pub date_expiration: Option<String>,
    pub chemin_fichier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

/// GET /api/documents
pub async fn list_documents(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(db::documents::list_documents(&state.db, &user.id).await?))
}

/// POST /api/documents
pub async fn create_document(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let expiration = req.date_expiration.as_deref().map(parse_datetime);
    Validator::new()
        .require("titre", req.titre.as_deref(), "Le titre est requis")
        .one_of("categorie", req.categorie.as_deref(), &DOCUMENT_CATEGORIES)
        .check(!matches!(expiration, Some(None)), "dateExpiration", "Invalid datetime")
        .finish()?;

    let document = Document {
        id: new_id(),
        user_id: user.id.clone(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        categorie: req.categorie.unwrap_or_else(|| "autre".to_string()),
        date_expiration: expiration.flatten(),
        chemin_fichier: req.chemin_fichier,
        notes: req.notes,
        date_ajout: Utc::now(),
    };
    db::documents::insert_document(&state.db, &document).await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/documents/expiring?days=30
pub async fn list_expiring(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<ExpiringQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    Validator::new().in_range("days", query.days, 0, 3650).finish()?;

    let now = Utc::now();
    let until = now + Duration::days(query.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS));
    Ok(Json(db::documents::list_expiring(&state.db, &user.id, now, until).await?))
}

pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/api/documents", get(list_documents).post(create_document))
        .route("/api/documents/expiring", get(list_expiring))
}
