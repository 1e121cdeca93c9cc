//! Recipes, demo seeding and AI suggestions

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
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{new_id, Ingredient, Recette, DEFAULT_RECETTE_TYPE, RECETTE_TYPES};
use crate::services::ai::{generate_json, prompts, GeneratedRecette, PromptPart};
use crate::services::seeds;
use crate::validation::{AppJson, JsonOrEmpty, Validator};
use crate::{db, AppState};

const NOT_FOUND: &str = "Aucune recette trouvée avec cet ID";

#[derive(Debug, Default, Deserialize)]
pub struct IngredientInput {
    pub nom: Option<String>,
    pub quantite: Option<String>,
    pub unite: Option<String>,
}

impl IngredientInput {
    fn into_ingredient(self) -> Ingredient {
        Ingredient {
            nom: self.nom.unwrap_or_default().trim().to_string(),
            quantite: self.quantite.unwrap_or_default().trim().to_string(),
            unite: self.unite.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecetteRequest {
    pub titre: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientInput>>,
    pub etapes: Option<Vec<String>>,
    pub duree_minutes: Option<i64>,
    pub cuisson_minutes: Option<i64>,
    pub calories: Option<f64>,
    pub proteines: Option<f64>,
    pub glucides: Option<f64>,
    pub lipides: Option<f64>,
    pub is_favorite: Option<bool>,
    pub last_cooked: Option<String>,
}

impl RecetteRequest {
    /// Same field rules for create and update; `titre` is only mandatory on create
    fn validate(&self, creating: bool) -> ApiResult<Option<DateTime<Utc>>> {
        let last_cooked = self.last_cooked.as_deref().map(parse_datetime);

        let mut v = Validator::new();
        if creating {
            v.require("titre", self.titre.as_deref(), "Le titre est requis");
        } else {
            v.not_blank("titre", self.titre.as_deref(), "Le titre est requis");
        }
        for (i, ingredient) in self.ingredients.iter().flatten().enumerate() {
            v.require(
                &format!("ingredients.{}.nom", i),
                ingredient.nom.as_deref(),
                "Le nom est requis",
            )
            .require(
                &format!("ingredients.{}.quantite", i),
                ingredient.quantite.as_deref(),
                "La quantité est requise",
            );
        }
        v.positive(
            "dureeMinutes",
            self.duree_minutes.map(|d| d as f64),
            "Number must be greater than 0",
        )
        .one_of("type", self.kind.as_deref(), &RECETTE_TYPES)
        .check(!matches!(last_cooked, Some(None)), "lastCooked", "Invalid datetime")
        .finish()?;

        Ok(last_cooked.flatten())
    }
}

fn recette_envelope(recette: &Recette) -> Value {
    json!({ "status": "success", "data": { "recette": recette } })
}

/// GET /api/recettes
pub async fn list_recettes(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let recettes = db::recettes::list_recettes(&state.db, &user.id).await?;
    Ok(Json(json!({
        "status": "success",
        "results": recettes.len(),
        "data": { "recettes": recettes },
    })))
}

/// POST /api/recettes
pub async fn create_recette(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<RecetteRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let last_cooked = req.validate(true)?;

    let now = Utc::now();
    let recette = Recette {
        id: new_id(),
        user_id: user.id.clone(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        kind: req.kind.unwrap_or_else(|| DEFAULT_RECETTE_TYPE.to_string()),
        image: req.image,
        ingredients: req
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .map(IngredientInput::into_ingredient)
            .collect(),
        etapes: req.etapes.unwrap_or_default(),
        duree_minutes: req.duree_minutes,
        cuisson_minutes: req.cuisson_minutes.unwrap_or(0),
        calories: req.calories,
        proteines: req.proteines,
        glucides: req.glucides,
        lipides: req.lipides,
        is_favorite: req.is_favorite.unwrap_or(false),
        last_cooked,
        created_at: now,
        updated_at: now,
    };
    db::recettes::insert_recette(&state.db, &recette).await?;

    Ok((StatusCode::CREATED, Json(recette_envelope(&recette))))
}

async fn load_or_404(state: &AppState, user: &AuthUser, id: &str) -> ApiResult<Recette> {
    db::recettes::load_recette(&state.db, &user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// GET /api/recettes/:id
pub async fn get_recette(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let recette = load_or_404(&state, &user, &id).await?;
    Ok(Json(recette_envelope(&recette)))
}

/// PATCH /api/recettes/:id
pub async fn update_recette(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<RecetteRequest>,
) -> ApiResult<Json<Value>> {
    let last_cooked = req.validate(false)?;
    let mut recette = load_or_404(&state, &user, &id).await?;

    if let Some(titre) = req.titre {
        recette.titre = titre.trim().to_string();
    }
    if let Some(kind) = req.kind {
        recette.kind = kind;
    }
    if req.image.is_some() {
        recette.image = req.image;
    }
    if let Some(ingredients) = req.ingredients {
        recette.ingredients = ingredients.into_iter().map(IngredientInput::into_ingredient).collect();
    }
    if let Some(etapes) = req.etapes {
        recette.etapes = etapes;
    }
    if req.duree_minutes.is_some() {
        recette.duree_minutes = req.duree_minutes;
    }
    if let Some(cuisson) = req.cuisson_minutes {
        recette.cuisson_minutes = cuisson;
    }
    recette.calories = req.calories.or(recette.calories);
    recette.proteines = req.proteines.or(recette.proteines);
    recette.glucides = req.glucides.or(recette.glucides);
    recette.lipides = req.lipides.or(recette.lipides);
    if let Some(favorite) = req.is_favorite {
        recette.is_favorite = favorite;
    }
    if last_cooked.is_some() {
        recette.last_cooked = last_cooked;
    }
    recette.updated_at = Utc::now();

    db::recettes::update_recette(&state.db, &recette).await?;
    Ok(Json(recette_envelope(&recette)))
}

/// DELETE /api/recettes/:id
pub async fn delete_recette(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !db::recettes::delete_recette(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recettes/seed
pub async fn seed_recettes(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let recettes = seeds::demo_recettes(&user.id, Utc::now());
    db::recettes::replace_recettes(&state.db, &user.id, &recettes).await?;
    info!(user = %user.id, count = recettes.len(), "Seeded demo recipes");
    Ok(Json(json!({
        "status": "success",
        "message": "Visual Recipes Seeded",
        "results": recettes.len(),
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    /// Ingredients on hand, folded into the prompt
    pub ingredients: Option<Vec<String>>,
}

impl GenerateRequest {
    fn user_prompt(&self) -> String {
        let mut request = self.prompt.clone().unwrap_or_default();
        let on_hand: Vec<&str> = self
            .ingredients
            .iter()
            .flatten()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect();
        if !on_hand.is_empty() {
            if request.trim().is_empty() {
                request = "une recette".to_string();
            }
            request = format!("{} avec : {}", request.trim(), on_hand.join(", "));
        }
        request
    }
}

/// POST /api/recettes/generate
///
/// Never fails: a placeholder recipe stands in when the model is unavailable.
pub async fn generate_recette(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonOrEmpty(req): JsonOrEmpty<GenerateRequest>,
) -> Json<Value> {
    let parts = vec![PromptPart::text(prompts::recipe(&req.user_prompt()))];
    let recette = match generate_json::<GeneratedRecette>(state.ai.as_ref(), parts).await {
        Ok(recette) => recette,
        Err(e) => {
            warn!(model = state.ai.name(), error = %e, "Recipe generation failed, using placeholder");
            GeneratedRecette::placeholder()
        }
    };
    Json(json!({ "status": "success", "data": { "recette": recette } }))
}

pub fn recette_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recettes", get(list_recettes).post(create_recette))
        .route("/api/recettes/seed", post(seed_recettes))
        .route("/api/recettes/generate", post(generate_recette))
        .route(
            "/api/recettes/:id",
            get(get_recette).patch(update_recette).delete(delete_recette),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_prompt_folds_ingredients() {
        let req = GenerateRequest {
            prompt: None,
            ingredients: Some(vec!["riz".into(), " ".into(), "oeufs".into()]),
        };
        assert_eq!(req.user_prompt(), "une recette avec : riz, oeufs");

        let req = GenerateRequest {
            prompt: Some("un dîner léger".into()),
            ingredients: None,
        };
        assert_eq!(req.user_prompt(), "un dîner léger");
    }

    #[test]
    fn test_ingredient_rules_are_indexed() {
        let req: RecetteRequest = serde_json::from_str(
            r#"{"titre":"Soupe","ingredients":[{"nom":"Carotte","quantite":"2"},{"nom":"","quantite":""}]}"#,
        )
        .unwrap();
        let err = req.validate(true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation Error: ingredients.1.nom: Le nom est requis, ingredients.1.quantite: La quantité est requise"
        );
    }
}
