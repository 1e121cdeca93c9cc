//! Projects with their internal task board

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
use crate::models::{
    new_id, Projet, ProjetView, TacheProjet, DEFAULT_PROJET_COLOR, PROJET_CATEGORIES, PROJET_STATUTS,
    TACHE_PROJET_STATUTS,
};
use crate::services::seeds;
use crate::validation::{double_option, AppJson, Validator};
use crate::{db, AppState};

const NOT_FOUND: &str = "Aucun projet trouvé avec cet ID";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacheProjetInput {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub titre: Option<String>,
    pub statut: Option<String>,
    pub date_limite: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjetRequest {
    pub titre: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub categorie: Option<String>,
    pub statut: Option<String>,
    pub date_debut: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub date_fin_prevue: Option<Option<String>>,
    pub taches: Option<Vec<TacheProjetInput>>,
    pub couleur: Option<String>,
}

/// Parsed and checked request dates and tasks
struct Checked {
    date_debut: Option<DateTime<Utc>>,
    date_fin_prevue: Option<Option<DateTime<Utc>>>,
    taches: Option<Vec<TacheProjet>>,
}

fn parse_field(v: &mut Validator, field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let parsed = raw.and_then(parse_datetime);
    v.check(raw.is_none() || parsed.is_some(), field, "Invalid datetime");
    parsed
}

impl ProjetRequest {
    fn check(&self, creating: bool) -> ApiResult<Checked> {
        let mut v = Validator::new();
        if creating {
            v.require("titre", self.titre.as_deref(), "Le titre est requis");
        } else {
            v.not_blank("titre", self.titre.as_deref(), "Le titre est requis");
        }
        v.one_of("categorie", self.categorie.as_deref(), &PROJET_CATEGORIES)
            .one_of("statut", self.statut.as_deref(), &PROJET_STATUTS);

        let date_debut = parse_field(&mut v, "dateDebut", self.date_debut.as_deref());
        let date_fin_prevue = self
            .date_fin_prevue
            .as_ref()
            .map(|raw| parse_field(&mut v, "dateFinPrevue", raw.as_deref()));

        let taches = self.taches.as_ref().map(|taches| {
            taches
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    v.require(&format!("taches.{}.titre", i), t.titre.as_deref(), "Le titre est requis")
                        .one_of(&format!("taches.{}.statut", i), t.statut.as_deref(), &TACHE_PROJET_STATUTS);
                    TacheProjet {
                        id: t.id.clone().unwrap_or_else(new_id),
                        titre: t.titre.clone().unwrap_or_default().trim().to_string(),
                        statut: t.statut.clone().unwrap_or_else(|| "a_faire".to_string()),
                        date_limite: parse_field(
                            &mut v,
                            &format!("taches.{}.dateLimite", i),
                            t.date_limite.as_deref(),
                        ),
                    }
                })
                .collect::<Vec<_>>()
        });

        v.finish()?;
        Ok(Checked {
            date_debut,
            date_fin_prevue,
            taches,
        })
    }
}

fn projet_envelope(projet: Projet) -> Value {
    json!({ "status": "success", "data": { "projet": ProjetView::from(projet) } })
}

/// GET /api/projets
pub async fn list_projets(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let projets: Vec<ProjetView> = db::projets::list_projets(&state.db, &user.id)
        .await?
        .into_iter()
        .map(ProjetView::from)
        .collect();
    Ok(Json(json!({
        "status": "success",
        "results": projets.len(),
        "data": { "projets": projets },
    })))
}

/// POST /api/projets
pub async fn create_projet(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<ProjetRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let checked = req.check(true)?;

    let projet = Projet {
        id: new_id(),
        user_id: user.id.clone(),
        titre: req.titre.unwrap_or_default().trim().to_string(),
        description: req.description.flatten(),
        categorie: req.categorie.unwrap_or_else(|| "perso".to_string()),
        statut: req.statut.unwrap_or_else(|| "actif".to_string()),
        date_debut: checked.date_debut.unwrap_or_else(Utc::now),
        date_fin_prevue: checked.date_fin_prevue.flatten(),
        taches: checked.taches.unwrap_or_default(),
        couleur: req.couleur.unwrap_or_else(|| DEFAULT_PROJET_COLOR.to_string()),
    };
    db::projets::insert_projet(&state.db, &projet).await?;

    Ok((StatusCode::CREATED, Json(projet_envelope(projet))))
}

async fn load_or_404(state: &AppState, user: &AuthUser, id: &str) -> ApiResult<Projet> {
    db::projets::load_projet(&state.db, &user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// GET /api/projets/:id
pub async fn get_projet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(projet_envelope(load_or_404(&state, &user, &id).await?)))
}

/// PATCH /api/projets/:id
pub async fn update_projet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<ProjetRequest>,
) -> ApiResult<Json<Value>> {
    let checked = req.check(false)?;
    let mut projet = load_or_404(&state, &user, &id).await?;

    if let Some(titre) = req.titre {
        projet.titre = titre.trim().to_string();
    }
    if let Some(description) = req.description {
        projet.description = description;
    }
    if let Some(categorie) = req.categorie {
        projet.categorie = categorie;
    }
    if let Some(statut) = req.statut {
        projet.statut = statut;
    }
    if let Some(date_debut) = checked.date_debut {
        projet.date_debut = date_debut;
    }
    if let Some(date_fin_prevue) = checked.date_fin_prevue {
        projet.date_fin_prevue = date_fin_prevue;
    }
    if let Some(taches) = checked.taches {
        projet.taches = taches;
    }
    if let Some(couleur) = req.couleur {
        projet.couleur = couleur;
    }

    db::projets::update_projet(&state.db, &projet).await?;
    Ok(Json(projet_envelope(projet)))
}

/// DELETE /api/projets/:id
pub async fn delete_projet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !db::projets::delete_projet(&state.db, &user.id, &id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/projets/seed
pub async fn seed_projets(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let projets = seeds::demo_projets(&user.id, Utc::now());
    db::projets::replace_projets(&state.db, &user.id, &projets).await?;
    info!(user = %user.id, count = projets.len(), "Seeded demo projects");
    Ok(Json(json!({
        "status": "success",
        "message": "Projects Seeded",
        "results": projets.len(),
    })))
}

pub fn projet_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projets", get(list_projets).post(create_projet))
        .route("/api/projets/seed", post(seed_projets))
        .route(
            "/api/projets/:id",
            get(get_projet).patch(update_projet).delete(delete_projet),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_rules_and_defaults() {
        let req: ProjetRequest = serde_json::from_str(
            r#"{"titre":"TP","taches":[{"titre":"Rapport","dateLimite":"2024-06-01"},{"titre":"Oral","statut":"fini"}]}"#,
        )
        .unwrap();
        let err = req.check(true).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Validation Error: taches.1.statut: Invalid enum value. Expected 'a_faire' | 'en_cours' | 'termine', received 'fini'"
        );

        let req: ProjetRequest =
            serde_json::from_str(r#"{"titre":"TP","taches":[{"titre":"Rapport","dateLimite":"2024-06-01"}]}"#)
                .unwrap();
        let checked = req.check(true).unwrap();
        let taches = checked.taches.unwrap();
        assert_eq!(taches[0].statut, "a_faire");
        assert!(taches[0].date_limite.is_some());
        assert!(!taches[0].id.is_empty());
    }

    #[test]
    fn test_explicit_null_clears_end_date() {
        let req: ProjetRequest = serde_json::from_str(r#"{"dateFinPrevue":null}"#).unwrap();
        let checked = req.check(false).unwrap();
        assert_eq!(checked.date_fin_prevue, Some(None));
    }
}
