//! Monthly budget threshold check
//!
//! Compares the month's spending to its income and raises a `budget_alert`
//! notification past 90% and past 100%. At most one unread alert exists per
//! user, month and threshold.

use std::collections::BTreeMap;

use chrono::Utc;
use lifeos_common::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::models::{new_id, Notification};

const ALERT_KIND: &str = "budget_alert";
const WARNING_RATIO: f64 = 0.9;
const OVERRUN_RATIO: f64 = 1.0;

/// Where spending stands relative to income
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BudgetStatus {
    /// No income recorded for the month, nothing to compare against
    NoIncome,
    Healthy(f64),
    Warning(f64),
    Overrun(f64),
}

impl BudgetStatus {
    pub fn classify(total_revenus: f64, total_depenses: f64) -> Self {
        if total_revenus == 0.0 {
            return BudgetStatus::NoIncome;
        }
        let ratio = total_depenses / total_revenus;
        if ratio > OVERRUN_RATIO {
            BudgetStatus::Overrun(ratio)
        } else if ratio > WARNING_RATIO {
            BudgetStatus::Warning(ratio)
        } else {
            BudgetStatus::Healthy(ratio)
        }
    }

    /// `(metadata type, message)` of the alert to raise, if any
    fn alert(&self) -> Option<(&'static str, String)> {
        match self {
            BudgetStatus::Overrun(ratio) => Some((
                "overrun",
                format!(
                    "Attention ! Vous avez dépassé votre budget du mois ({}%).",
                    (ratio * 100.0).round() as i64
                ),
            )),
            BudgetStatus::Warning(_) => Some((
                "warning_90",
                "Attention ! Vous avez consommé 90% de votre budget.".to_string(),
            )),
            BudgetStatus::NoIncome | BudgetStatus::Healthy(_) => None,
        }
    }
}

/// Evaluate the month and store an alert when a threshold is crossed
///
/// Returns the notification created, if any.
pub async fn check_budget_health(
    pool: &SqlitePool,
    user_id: &str,
    mois: i64,
    annee: i64,
) -> Result<Option<Notification>> {
    let total_revenus = db::revenus::total_for_month(pool, user_id, mois, annee).await?;
    let total_depenses = db::depenses::total_for_month(pool, user_id, mois, annee).await?;

    let status = BudgetStatus::classify(total_revenus, total_depenses);
    let Some((alert_type, message)) = status.alert() else {
        return Ok(None);
    };

    let mois_str = mois.to_string();
    let annee_str = annee.to_string();
    if db::notifications::unread_alert_exists(pool, user_id, ALERT_KIND, &mois_str, &annee_str, alert_type)
        .await?
    {
        return Ok(None);
    }

    let metadata = BTreeMap::from([
        ("mois".to_string(), mois_str),
        ("annee".to_string(), annee_str),
        ("type".to_string(), alert_type.to_string()),
    ]);

    let notification = Notification {
        id: new_id(),
        user_id: user_id.to_string(),
        kind: ALERT_KIND.to_string(),
        message,
        read: false,
        metadata,
        created_at: Utc::now(),
    };
    db::notifications::insert_notification(pool, &notification).await?;

    info!(user = %user_id, mois, annee, alert = alert_type, "Budget alert raised");
    Ok(Some(notification))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(BudgetStatus::classify(0.0, 500.0), BudgetStatus::NoIncome);
        assert_eq!(BudgetStatus::classify(1000.0, 900.0), BudgetStatus::Healthy(0.9));
        assert_eq!(BudgetStatus::classify(1000.0, 950.0), BudgetStatus::Warning(0.95));
        assert_eq!(BudgetStatus::classify(1000.0, 1000.0), BudgetStatus::Warning(1.0));
        assert_eq!(BudgetStatus::classify(1000.0, 1250.0), BudgetStatus::Overrun(1.25));
    }

    #[test]
    fn test_overrun_message_rounds_percentage() {
        let (kind, message) = BudgetStatus::Overrun(1.2345).alert().unwrap();
        assert_eq!(kind, "overrun");
        assert_eq!(message, "Attention ! Vous avez dépassé votre budget du mois (123%).");
        // Halves round up
        let (_, message) = BudgetStatus::classify(1000.0, 1125.0).alert().unwrap();
        assert_eq!(message, "Attention ! Vous avez dépassé votre budget du mois (113%).");
        assert!(BudgetStatus::Healthy(0.5).alert().is_none());
    }
}
