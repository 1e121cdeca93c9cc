//! Recipes, weekly meal plans and shopping lists

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const RECETTE_TYPES: [&str; 4] = ["Petit-déjeuner", "Déjeuner", "Dîner", "Collation"];

pub const DEFAULT_RECETTE_TYPE: &str = "Déjeuner";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub nom: String,
    /// Free text: "2", "1/2", "200", "1,5"
    pub quantite: String,
    #[serde(default)]
    pub unite: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recette {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub image: Option<String>,
    #[sqlx(json)]
    pub ingredients: Vec<Ingredient>,
    #[sqlx(json)]
    pub etapes: Vec<String>,
    pub duree_minutes: Option<i64>,
    pub cuisson_minutes: i64,
    pub calories: Option<f64>,
    pub proteines: Option<f64>,
    pub glucides: Option<f64>,
    pub lipides: Option<f64>,
    pub is_favorite: bool,
    pub last_cooked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recipe placed on a day of the week (`jour` 0 = Monday … 6 = Sunday)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub jour: u8,
    pub recette_id: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlanningSemaine {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    /// Monday of the planned week
    pub date_debut: NaiveDate,
    #[sqlx(json)]
    pub slots: Vec<Slot>,
    pub created_at: DateTime<Utc>,
}

/// Slot with its recipe resolved; `null` when the recipe no longer exists
#[derive(Debug, Clone, Serialize)]
pub struct PopulatedSlot {
    pub jour: u8,
    #[serde(rename = "recetteId")]
    pub recette: Option<Recette>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedPlanning {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub date_debut: NaiveDate,
    pub slots: Vec<PopulatedSlot>,
    pub created_at: DateTime<Utc>,
}

fn default_quantite() -> String {
    "1".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCourse {
    pub nom: String,
    #[serde(default = "default_quantite")]
    pub quantite: String,
    #[serde(default)]
    pub unite: String,
    #[serde(default)]
    pub prix: Option<f64>,
    #[serde(default)]
    pub coche: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ListeCourse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    #[sqlx(json)]
    pub items: Vec<ItemCourse>,
    pub date_generation: DateTime<Utc>,
    pub total_estime: Option<f64>,
    pub source_planning_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ListeCourse {
    /// Estimated total, falling back to the sum of item prices
    pub fn estimated_total(&self) -> f64 {
        self.total_estime
            .unwrap_or_else(|| self.items.iter().filter_map(|i| i.prix).sum())
    }
}
