//! Unified calendar feed
//!
//! Flattens events, open tasks, planned meals and workouts of a time window into one
//! list of display items, ordered by start.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use lifeos_common::dates::{start_of_day, week_start};
use lifeos_common::Result;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db;
use crate::models::{Evenement, PlanningSemaine, Recette, SeanceSport, Tache};

const EVENT_COLOR: &str = "#3b82f6";
const TASK_COLOR: &str = "#10b981";
const MEAL_COLOR: &str = "#f59e0b";
const SPORT_COLOR: &str = "#8b5cf6";

/// Window used when the client gives no bounds
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub color: &'static str,
    pub details: serde_json::Value,
}

/// Inclusive time window
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn around(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now + Duration::days(days),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Load every source for `window` and build the feed
pub async fn collect_items(pool: &SqlitePool, user_id: &str, window: Window) -> Result<Vec<CalendarItem>> {
    let evenements = db::evenements::list_in_range(pool, user_id, window.start, window.end).await?;
    let taches = db::taches::list_open_due_in_range(pool, user_id, window.start, window.end).await?;
    let seances = db::seances::list_in_range(pool, user_id, window.start, window.end).await?;
    let plannings = db::plannings::list_between(
        pool,
        user_id,
        week_start(window.start.date_naive()),
        window.end.date_naive(),
    )
    .await?;

    let mut recette_ids: Vec<String> = plannings
        .iter()
        .flat_map(|p| p.slots.iter().map(|s| s.recette_id.clone()))
        .collect();
    recette_ids.sort();
    recette_ids.dedup();
    let recettes = db::recettes::load_many(pool, user_id, &recette_ids).await?;

    Ok(build_items(window, &evenements, &taches, &plannings, &recettes, &seances))
}

/// Assemble the feed from already-loaded records
pub fn build_items(
    window: Window,
    evenements: &[Evenement],
    taches: &[Tache],
    plannings: &[PlanningSemaine],
    recettes: &[Recette],
    seances: &[SeanceSport],
) -> Vec<CalendarItem> {
    let mut items = Vec::new();

    for ev in evenements {
        items.push(CalendarItem {
            id: ev.id.clone(),
            title: ev.titre.clone(),
            start: ev.debut,
            end: Some(ev.fin),
            all_day: None,
            kind: "event",
            color: EVENT_COLOR,
            details: json!({ "lieu": ev.lieu, "type": ev.kind }),
        });
    }

    for tache in taches {
        let Some(due) = tache.date_echeance else { continue };
        items.push(CalendarItem {
            id: tache.id.clone(),
            title: format!("Task: {}", tache.titre),
            start: due,
            end: None,
            all_day: Some(true),
            kind: "task",
            color: TASK_COLOR,
            details: json!({}),
        });
    }

    let by_id: HashMap<&str, &Recette> = recettes.iter().map(|r| (r.id.as_str(), r)).collect();
    for planning in plannings {
        for slot in &planning.slots {
            let day = start_of_day(planning.date_debut + Duration::days(slot.jour as i64));
            if !window.contains(day) {
                continue;
            }
            let Some(recette) = by_id.get(slot.recette_id.as_str()) else { continue };
            items.push(CalendarItem {
                id: format!("meal-{}-{}", planning.id, slot.jour),
                title: recette.titre.clone(),
                start: day,
                end: None,
                all_day: Some(true),
                kind: "meal",
                color: MEAL_COLOR,
                details: json!({ "type": recette.kind }),
            });
        }
    }

    for seance in seances {
        let end = seance.duree_totale.map(|minutes| seance.date + Duration::minutes(minutes));
        items.push(CalendarItem {
            id: seance.id.clone(),
            title: seance.titre.clone(),
            start: seance.date,
            end,
            all_day: None,
            kind: "sport",
            color: SPORT_COLOR,
            details: json!({ "type": seance.kind }),
        });
    }

    items.sort_by_key(|item| item.start);
    items
}
