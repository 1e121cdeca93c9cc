//! Calendar events, weekly event templates and to-do items

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const EVENT_SOURCES: [&str; 3] = ["ics", "template", "manual"];

pub const DEFAULT_EVENT_TYPE: &str = "cours";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Evenement {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    pub debut: DateTime<Utc>,
    pub fin: DateTime<Utc>,
    pub lieu: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub template_id: Option<String>,
    pub ics_uid: Option<String>,
    pub couleur: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Recurring weekly slot used to stamp out events
///
/// `jour_semaine` counts from Sunday (0) to Saturday (6).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEvenement {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    pub jour_semaine: i64,
    pub heure_debut: String,
    pub duree_minutes: i64,
    pub lieu: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tache {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    pub description: String,
    pub terminee: bool,
    pub date_echeance: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
