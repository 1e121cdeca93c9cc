//! Shopping lists generated from the weekly meal plan

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::planning::monday_of;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, ItemCourse, ListeCourse};
use crate::services::shopping_list::{aggregate_ingredients, estimate_total};
use crate::validation::{double_option, AppJson, JsonOrEmpty, Validator};
use crate::{db, AppState};

const NOT_FOUND: &str = "Liste introuvable";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenererRequest {
    pub date_debut: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemInput {
    pub nom: Option<String>,
    pub quantite: Option<String>,
    pub unite: Option<String>,
    pub prix: Option<f64>,
    pub coche: Option<bool>,
}

impl ItemInput {
    fn into_item(self) -> ItemCourse {
        ItemCourse {
            nom: self.nom.unwrap_or_default().trim().to_string(),
            quantite: self.quantite.unwrap_or_else(|| "1".to_string()),
            unite: self.unite.unwrap_or_default(),
            prix: self.prix,
            coche: self.coche.unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListeRequest {
    pub items: Option<Vec<ItemInput>>,
    #[serde(default, deserialize_with = "double_option")]
    pub total_estime: Option<Option<f64>>,
}

impl UpdateListeRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Validator::new();
        for (i, item) in self.items.iter().flatten().enumerate() {
            v.require(&format!("items.{}.nom", i), item.nom.as_deref(), "Le nom est requis");
        }
        v.finish()
    }

    fn apply(self, liste: &mut ListeCourse) {
        if let Some(items) = self.items {
            liste.items = items.into_iter().map(ItemInput::into_item).collect();
        }
        if let Some(total) = self.total_estime {
            liste.total_estime = total;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub coche: Option<bool>,
}

/// GET /api/liste-courses
pub async fn get_liste(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let body = match db::listes::latest_liste(&state.db, &user.id).await? {
        Some(liste) => json!(liste),
        None => json!({ "items": [], "totalEstime": null, "dateGeneration": null }),
    };
    Ok(Json(body))
}

/// POST /api/liste-courses/generer
pub async fn generer_liste(
    State(state): State<AppState>,
    user: AuthUser,
    JsonOrEmpty(req): JsonOrEmpty<GenererRequest>,
) -> ApiResult<(StatusCode, Json<ListeCourse>)> {
    let monday = monday_of("dateDebut", req.date_debut.as_deref())?;

    let planning = db::plannings::load_by_week(&state.db, &user.id, monday)
        .await?
        .filter(|p| !p.slots.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Aucun planning pour cette semaine".to_string()))?;

    let mut ids: Vec<String> = Vec::new();
    for slot in &planning.slots {
        if !slot.recette_id.is_empty() && !ids.contains(&slot.recette_id) {
            ids.push(slot.recette_id.clone());
        }
    }
    let recettes = db::recettes::load_many(&state.db, &user.id, &ids).await?;
    // Each distinct recipe counts once, in slot order
    let ordered = ids.iter().filter_map(|id| recettes.iter().find(|r| &r.id == id));

    let items = aggregate_ingredients(ordered);
    let now = Utc::now();
    let liste = ListeCourse {
        id: new_id(),
        user_id: user.id.clone(),
        total_estime: estimate_total(&items),
        items,
        date_generation: now,
        source_planning_id: Some(planning.id.clone()),
        created_at: now,
    };
    db::listes::insert_liste(&state.db, &liste).await?;

    info!(user = %user.id, week = %monday, items = liste.items.len(), "Generated shopping list");
    Ok((StatusCode::CREATED, Json(liste)))
}

/// PUT /api/liste-courses
///
/// Updates the latest list, creating one when the user has none.
pub async fn update_latest_liste(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<UpdateListeRequest>,
) -> ApiResult<Json<ListeCourse>> {
    req.validate()?;

    match db::listes::latest_liste(&state.db, &user.id).await? {
        Some(mut liste) => {
            // An explicit null keeps the current total here
            let keep_total = matches!(req.total_estime, Some(None));
            let previous_total = liste.total_estime;
            req.apply(&mut liste);
            if keep_total {
                liste.total_estime = previous_total;
            }
            db::listes::update_liste(&state.db, &liste).await?;
            Ok(Json(liste))
        }
        None => {
            let now = Utc::now();
            let mut liste = ListeCourse {
                id: new_id(),
                user_id: user.id.clone(),
                items: Vec::new(),
                date_generation: now,
                total_estime: None,
                source_planning_id: None,
                created_at: now,
            };
            req.apply(&mut liste);
            db::listes::insert_liste(&state.db, &liste).await?;
            Ok(Json(liste))
        }
    }
}

/// PUT /api/liste-courses/:id
pub async fn update_liste(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateListeRequest>,
) -> ApiResult<Json<ListeCourse>> {
    req.validate()?;

    let mut liste = db::listes::load_liste(&state.db, &user.id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    req.apply(&mut liste);
    db::listes::update_liste(&state.db, &liste).await?;

    Ok(Json(liste))
}

/// PATCH /api/liste-courses/:id/items/:index
///
/// An out-of-range or non-numeric index leaves the list unchanged.
pub async fn toggle_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, index)): Path<(String, String)>,
    AppJson(req): AppJson<ToggleRequest>,
) -> ApiResult<Json<ListeCourse>> {
    Validator::new().present("coche", req.coche.as_ref()).finish()?;

    let mut liste = db::listes::load_liste(&state.db, &user.id, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let item = index.parse::<usize>().ok().and_then(|i| liste.items.get_mut(i));
    if let Some(item) = item {
        item.coche = req.coche.unwrap_or(false);
        db::listes::update_liste(&state.db, &liste).await?;
    }

    Ok(Json(liste))
}

pub fn liste_courses_routes() -> Router<AppState> {
    Router::new()
        .route("/api/liste-courses", get(get_liste).put(update_latest_liste))
        .route("/api/liste-courses/generer", post(generer_liste))
        .route("/api/liste-courses/:id", put(update_liste))
        .route("/api/liste-courses/:id/items/:index", patch(toggle_item))
}
