//! Generative model access
//!
//! Handlers talk to a [`GenerativeModel`] trait object held in the application state, so
//! the Gemini client can be swapped for [`DisabledModel`] when no key is configured, or
//! for a scripted model in tests.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Ingredient;

pub use gemini::GeminiClient;

/// Generative model errors
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Generative model is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One piece of a multimodal prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    InlineImage { mime_type: String, data: Vec<u8> },
}

impl PromptPart {
    pub fn text(value: impl Into<String>) -> Self {
        PromptPart::Text(value.into())
    }
}

/// Text completion over a multimodal prompt
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs
    fn name(&self) -> &str;

    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String, AiError>;
}

/// Stand-in used when no API key is configured
pub struct DisabledModel;

#[async_trait]
impl GenerativeModel for DisabledModel {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _parts: Vec<PromptPart>) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }
}

/// Run the prompt and decode the reply as JSON
pub async fn generate_json<T: DeserializeOwned>(
    model: &dyn GenerativeModel,
    parts: Vec<PromptPart>,
) -> Result<T, AiError> {
    let text = model.generate(parts).await?;
    let cleaned = strip_code_fences(&text);
    serde_json::from_str(cleaned).map_err(|e| {
        tracing::debug!(model = model.name(), reply = %text, "Unparseable model reply");
        AiError::Parse(e.to_string())
    })
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````) if present
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Fields extracted from a receipt photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptScan {
    pub montant: f64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub libelle: String,
    #[serde(default)]
    pub categorie: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub category: String,
    pub message: String,
    pub severity: String,
}

/// Three-month spending analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalysis {
    #[serde(default)]
    pub predictions: String,
    #[serde(default)]
    pub alerts: Vec<BudgetAlert>,
    #[serde(default)]
    pub savings_tips: Vec<String>,
    #[serde(default)]
    pub investment_ideas: Vec<String>,
    pub financial_health_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeBattery {
    pub score: f64,
    pub status: String,
    pub physical: f64,
    pub mental: f64,
    pub financial: f64,
}

/// Dashboard briefing produced from the life context snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeBriefing {
    pub greeting: String,
    pub message: String,
    #[serde(default)]
    pub action_item: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub widgets_to_highlight: Vec<String>,
    pub life_battery: LifeBattery,
}

fn default_priority() -> String {
    "normal".to_string()
}

impl LifeBriefing {
    /// Returned whenever the model cannot produce a briefing
    pub fn fallback() -> Self {
        Self {
            greeting: "Bonjour !".to_string(),
            message: "Je n'arrive pas à analyser tes données pour le moment, mais je suis là.".to_string(),
            action_item: "Check tes notifications".to_string(),
            priority: "low".to_string(),
            widgets_to_highlight: Vec::new(),
            life_battery: LifeBattery {
                score: 75.0,
                status: "Moyen".to_string(),
                physical: 70.0,
                mental: 80.0,
                financial: 75.0,
            },
        }
    }
}

/// Recipe suggestion; not persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecette {
    pub titre: String,
    #[serde(rename = "type", default = "default_recette_type")]
    pub kind: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub etapes: Vec<String>,
    #[serde(default)]
    pub duree_minutes: i64,
    #[serde(default)]
    pub calories: f64,
}

fn default_recette_type() -> String {
    crate::models::DEFAULT_RECETTE_TYPE.to_string()
}

impl GeneratedRecette {
    pub fn placeholder() -> Self {
        Self {
            titre: "Recette IA (Demo)".to_string(),
            kind: default_recette_type(),
            ingredients: Vec::new(),
            etapes: vec!["En cours de développement".to_string()],
            duree_minutes: 0,
            calories: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(&'static str);

    #[async_trait]
    impl GenerativeModel for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _parts: Vec<PromptPart>) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_generate_json_parses_fenced_reply() {
        let model = Scripted("```json\n{\"montant\": 12.5, \"libelle\": \"Carrefour\", \"categorie\": \"Alimentation\"}\n```");
        let scan: ReceiptScan = generate_json(&model, vec![PromptPart::text("x")]).await.unwrap();
        assert_eq!(scan.montant, 12.5);
        assert_eq!(scan.libelle, "Carrefour");
        assert!(scan.date.is_none());
    }

    #[tokio::test]
    async fn test_generate_json_reports_parse_errors() {
        let model = Scripted("Désolé, je ne peux pas.");
        let result: Result<FinancialAnalysis, _> = generate_json(&model, Vec::new()).await;
        assert!(matches!(result, Err(AiError::Parse(_))));
    }

    #[tokio::test]
    async fn test_disabled_model() {
        let result = DisabledModel.generate(Vec::new()).await;
        assert!(matches!(result, Err(AiError::NotConfigured)));
    }

    #[test]
    fn test_briefing_defaults() {
        let briefing: LifeBriefing = serde_json::from_str(
            r#"{"greeting":"Salut","message":"ok","lifeBattery":{"score":50,"status":"Moyen","physical":1,"mental":2,"financial":3}}"#,
        )
        .unwrap();
        assert_eq!(briefing.priority, "normal");
        assert!(briefing.widgets_to_highlight.is_empty());
    }
}
