//! Unified calendar feed

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use lifeos_common::dates::parse_datetime;
use serde::Deserialize;

use super::evenements::{new_evenement, EvenementRequest};
use super::taches::{new_tache, TacheRequest};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{Evenement, Tache};
use crate::services::calendar::{self, CalendarItem, Window, DEFAULT_WINDOW_DAYS};
use crate::validation::{AppJson, AppQuery};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl CalendarQuery {
    fn window(&self) -> ApiResult<Window> {
        let default = Window::around(Utc::now(), DEFAULT_WINDOW_DAYS);
        let parse = |field: &str, raw: &Option<String>| match raw.as_deref() {
            Some(value) => parse_datetime(value)
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest(format!("Paramètre {} invalide", field))),
            None => Ok(None),
        };
        Ok(Window {
            start: parse("start", &self.start)?.unwrap_or(default.start),
            end: parse("end", &self.end)?.unwrap_or(default.end),
        })
    }
}

/// GET /api/calendar?start=&end=
pub async fn get_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<CalendarQuery>,
) -> ApiResult<Json<Vec<CalendarItem>>> {
    let window = query.window()?;
    Ok(Json(calendar::collect_items(&state.db, &user.id, window).await?))
}

/// POST /api/calendar/event
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<EvenementRequest>,
) -> ApiResult<(StatusCode, Json<Evenement>)> {
    let evenement = new_evenement(&user.id, req)?;
    db::evenements::insert_evenement(&state.db, &evenement).await?;
    Ok((StatusCode::CREATED, Json(evenement)))
}

/// POST /api/calendar/task
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<TacheRequest>,
) -> ApiResult<(StatusCode, Json<Tache>)> {
    let tache = new_tache(&user.id, req)?;
    db::taches::insert_tache(&state.db, &tache).await?;
    Ok((StatusCode::CREATED, Json(tache)))
}

pub fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/api/calendar", get(get_calendar))
        .route("/api/calendar/event", post(create_event))
        .route("/api/calendar/task", post(create_task))
}
