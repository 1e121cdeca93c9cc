//! To-do items

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use lifeos_common::dates::parse_datetime;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Tache};
use crate::validation::{double_option, AppJson, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacheRequest {
    pub titre: Option<String>,
    pub description: Option<String>,
    pub terminee: Option<bool>,
    /// `null` clears the due date on update
    #[serde(default, deserialize_with = "double_option")]
    pub date_echeance: Option<Option<String>>,
}

impl TacheRequest {
    /// `Ok(None)` when absent, `Ok(Some(None))` when cleared
    fn due_date(&self) -> ApiResult<Option<Option<DateTime<Utc>>>> {
        match &self.date_echeance {
            None => Ok(None),
            Some(None) => Ok(Some(None)),
            Some(Some(raw)) => parse_datetime(raw).map(|d| Some(Some(d))).ok_or_else(|| {
                ApiError::Validation(vec!["dateEcheance: Invalid datetime".to_string()])
            }),
        }
    }
}

/// Validate a create request into a new task owned by `user_id`
pub(crate) fn new_tache(user_id: &str, req: TacheRequest) -> ApiResult<Tache> {
    Validator::new()
        .require("titre", req.titre.as_deref(), "Le titre est requis")
        .finish()?;
    let date_echeance = req.due_date()?.flatten();

    Ok(Tache {
        id: new_id(),
        user_id: user_id.to_string(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        description: req.description.unwrap_or_default(),
        terminee: req.terminee.unwrap_or(false),
        date_echeance,
        created_at: Utc::now(),
    })
}

/// GET /api/taches
pub async fn list_taches(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<Tache>>> {
    Ok(Json(db::taches::list_taches(&state.db, &user.id).await?))
}

/// POST /api/taches
pub async fn create_tache(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<TacheRequest>,
) -> ApiResult<(StatusCode, Json<Tache>)> {
    let tache = new_tache(&user.id, req)?;
    db::taches::insert_tache(&state.db, &tache).await?;
    Ok((StatusCode::CREATED, Json(tache)))
}

/// PATCH /api/taches/:id
pub async fn update_tache(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<TacheRequest>,
) -> ApiResult<Json<Tache>> {
    Validator::new()
        .not_blank("titre", req.titre.as_deref(), "Le titre est requis")
        .finish()?;
    let due = req.due_date()?;

    let mut tache = db::taches::load_tache(&state.db, &user.id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Aucune tâche trouvée avec cet ID".to_string()))?;

    if let Some(titre) = req.titre {
        tache.titre = titre.trim().to_string();
    }
    if let Some(description) = req.description {
        tache.description = description;
    }
    if let Some(terminee) = req.terminee {
        tache.terminee = terminee;
    }
    if let Some(date_echeance) = due {
        tache.date_echeance = date_echeance;
    }

    db::taches::update_tache(&state.db, &tache).await?;
    Ok(Json(tache))
}

/// DELETE /api/taches/:id
pub async fn delete_tache(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !db::taches::delete_tache(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound("Aucune tâche trouvée avec cet ID".to_string()));
    }
    Ok(Json(json!({ "message": "Tâche supprimée" })))
}

pub fn tache_routes() -> Router<AppState> {
    Router::new()
        .route("/api/taches", get(list_taches).post(create_tache))
        .route("/api/taches/:id", patch(update_tache).delete(delete_tache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_date_absent_null_and_value() {
        let req: TacheRequest = serde_json::from_str(r#"{"titre":"x"}"#).unwrap();
        assert!(req.due_date().unwrap().is_none());

        let req: TacheRequest = serde_json::from_str(r#"{"dateEcheance":null}"#).unwrap();
        assert_eq!(req.due_date().unwrap(), Some(None));

        let req: TacheRequest = serde_json::from_str(r#"{"dateEcheance":"2024-05-01"}"#).unwrap();
        assert!(req.due_date().unwrap().unwrap().is_some());

        let req: TacheRequest = serde_json::from_str(r#"{"dateEcheance":"demain"}"#).unwrap();
        assert!(req.due_date().is_err());
    }
}
