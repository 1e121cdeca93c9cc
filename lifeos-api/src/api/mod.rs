//! HTTP handlers, one module per resource
//!
//! Each module exposes a `*_routes()` builder merged by [`crate::build_router`].
//! Every route outside `health` and the public part of `auth` takes an
//! [`AuthUser`](crate::auth::AuthUser) and scopes its queries to that user.

pub mod accounts;
pub mod ai;
pub mod auth;
pub mod budget;
pub mod calendar;
pub mod depenses;
pub mod documents;
pub mod evenements;
pub mod habitudes;
pub mod health;
pub mod humeurs;
pub mod liste_courses;
pub mod notifications;
pub mod planning;
pub mod projets;
pub mod recettes;
pub mod revenus;
pub mod seances;
pub mod taches;
pub mod templates;
pub mod transactions;

pub use accounts::account_routes;
pub use ai::ai_routes;
pub use auth::auth_routes;
pub use budget::budget_routes;
pub use calendar::calendar_routes;
pub use depenses::depense_routes;
pub use documents::document_routes;
pub use evenements::evenement_routes;
pub use habitudes::habitude_routes;
pub use health::health_routes;
pub use humeurs::humeur_routes;
pub use liste_courses::liste_courses_routes;
pub use notifications::notification_routes;
pub use planning::planning_routes;
pub use projets::projet_routes;
pub use recettes::recette_routes;
pub use revenus::revenu_routes;
pub use seances::seance_routes;
pub use taches::tache_routes;
pub use templates::template_routes;
pub use transactions::transaction_routes;

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::{ApiError, AppState};

/// Unmatched requests
///
/// `/api/*` paths get the JSON 404. Anything else is served from the single-page
/// app build when one is configured, falling back to its `index.html`.
pub async fn fallback(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path();
    let is_api = path == "/api" || path.starts_with("/api/");

    match (&state.config.static_dir, is_api) {
        (Some(dir), false) => {
            let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
            match spa.oneshot(req).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            }
        }
        _ => {
            let target = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| path.to_string());
            ApiError::NotFound(format!("Can't find {} on this server!", target)).into_response()
        }
    }
}
