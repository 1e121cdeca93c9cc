//! Financial analysis and life-context briefing from the generative model

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use lifeos_common::dates::trailing_months;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::ai::{generate_json, prompts, FinancialAnalysis, LifeBriefing, PromptPart};
use crate::services::life_context::{load_records, FinanceContext, LifeContext};
use crate::validation::{AppJson, JsonOrEmpty, Validator};
use crate::{db, AppState};

/// Months covered by the analysis, the requested one included
const ANALYSIS_MONTHS: u32 = 3;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub month: Option<i64>,
    pub year: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContextRequest {
    pub prompt: Option<String>,
}

/// POST /api/ai/analyze
pub async fn analyze(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<AnalyzeRequest>,
) -> ApiResult<Json<Value>> {
    let (month, year) = match (req.month, req.year) {
        (Some(month), Some(year)) if month != 0 && year != 0 => (month, year),
        _ => return Err(ApiError::BadRequest("Veuillez fournir le mois et l'année.".to_string())),
    };
    Validator::new()
        .in_range("month", Some(month), 1, 12)
        .in_range("year", Some(year), 2000, 2100)
        .finish()?;

    let periods = trailing_months(month as u32, year as i32, ANALYSIS_MONTHS);
    let revenus = db::revenus::list_for_periods(&state.db, &user.id, &periods).await?;
    let depenses = db::depenses::list_for_periods(&state.db, &user.id, &periods).await?;

    let context = FinanceContext::build(month as u32, year as i32, &revenus, &depenses);
    let prompt = prompts::financial_analysis(&context).map_err(lifeos_common::Error::from)?;

    let analysis: FinancialAnalysis = generate_json(state.ai.as_ref(), vec![PromptPart::text(prompt)])
        .await
        .map_err(|e| {
            warn!(model = state.ai.name(), error = %e, "Financial analysis failed");
            ApiError::Upstream("Impossible de générer l'analyse financière.".to_string())
        })?;

    Ok(Json(json!({ "status": "success", "data": analysis })))
}

/// POST /api/ai/context
///
/// Always answers: any failure yields the fallback briefing.
pub async fn life_context(
    State(state): State<AppState>,
    user: AuthUser,
    JsonOrEmpty(req): JsonOrEmpty<ContextRequest>,
) -> Json<Value> {
    let briefing = match briefing(&state, &user, req.prompt.as_deref().unwrap_or_default()).await {
        Ok(briefing) => briefing,
        Err(e) => {
            warn!(user = %user.id, error = %e, "Life context briefing failed, using fallback");
            LifeBriefing::fallback()
        }
    };
    Json(json!({ "status": "success", "data": briefing }))
}

async fn briefing(state: &AppState, user: &AuthUser, user_prompt: &str) -> anyhow::Result<LifeBriefing> {
    let now = Utc::now();
    let records = load_records(&state.db, &user.id, now).await?;
    let context = LifeContext::build(now, &records);
    let prompt = prompts::life_context(&context, user_prompt)?;
    Ok(generate_json(state.ai.as_ref(), vec![PromptPart::text(prompt)]).await?)
}

pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ai/analyze", post(analyze))
        .route("/api/ai/context", post(life_context))
}
