//! Snapshots of the user's data handed to the generative model

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use lifeos_common::Result;

use crate::db;
use crate::models::{Account, Depense, Evenement, Projet, Revenu, SeanceSport, Transaction, LIQUID_ACCOUNT_TYPES};

const RECENT_DAYS: i64 = 7;
const RECENT_TRANSACTIONS: i64 = 5;
const UPCOMING_HOURS: i64 = 48;
const BUSY_DAY_EVENTS: usize = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSnapshot {
    pub total_liquidity: f64,
    pub accounts: Vec<String>,
    pub recent_spending: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub last_workout: String,
    pub workout_count_last_week: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSnapshot {
    pub next_events: Vec<String>,
    pub is_busy_today: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSnapshot {
    pub active_projects_count: usize,
    pub urgent_projects: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LifeContext {
    pub timestamp: DateTime<Utc>,
    pub finance: FinanceSnapshot,
    pub health: HealthSnapshot,
    pub calendar: CalendarSnapshot,
    pub work: WorkSnapshot,
}

/// Raw records a [`LifeContext`] is built from
pub struct LifeRecords {
    pub accounts: Vec<Account>,
    pub recent_transactions: Vec<Transaction>,
    pub last_workout: Option<SeanceSport>,
    pub workouts_last_week: i64,
    pub upcoming_events: Vec<Evenement>,
    pub active_projects: Vec<Projet>,
}

pub async fn load_records(pool: &SqlitePool, user_id: &str, now: DateTime<Utc>) -> Result<LifeRecords> {
    let last_week = now - Duration::days(RECENT_DAYS);
    Ok(LifeRecords {
        accounts: db::accounts::list_accounts(pool, user_id).await?,
        recent_transactions: db::transactions::list_recent(pool, user_id, last_week, RECENT_TRANSACTIONS)
            .await?,
        last_workout: db::seances::latest_seance(pool, user_id).await?,
        workouts_last_week: db::seances::count_since(pool, user_id, last_week).await?,
        upcoming_events: db::evenements::list_in_range(
            pool,
            user_id,
            now,
            now + Duration::hours(UPCOMING_HOURS),
        )
        .await?,
        active_projects: db::projets::list_active(pool, user_id).await?,
    })
}

impl LifeContext {
    pub fn build(now: DateTime<Utc>, records: &LifeRecords) -> Self {
        let total_liquidity: f64 = records
            .accounts
            .iter()
            .filter(|a| LIQUID_ACCOUNT_TYPES.contains(&a.kind.as_str()))
            .map(|a| a.balance)
            .sum();

        let last_workout = match &records.last_workout {
            Some(s) => format!("{} ({}) le {}", s.titre, s.split_name, s.date.format("%Y-%m-%d")),
            None => "Aucune séance récente".to_string(),
        };

        let today = now.date_naive();
        let events_today = records
            .upcoming_events
            .iter()
            .filter(|e| e.debut.date_naive() == today)
            .count();

        let deadline = now + Duration::days(RECENT_DAYS);

        Self {
            timestamp: now,
            finance: FinanceSnapshot {
                total_liquidity,
                accounts: records
                    .accounts
                    .iter()
                    .map(|a| format!("{}: {}€", a.name, a.balance))
                    .collect(),
                recent_spending: records
                    .recent_transactions
                    .iter()
                    .map(|t| format!("{} ({}€)", t.title, t.amount))
                    .collect(),
            },
            health: HealthSnapshot {
                last_workout,
                workout_count_last_week: records.workouts_last_week,
            },
            calendar: CalendarSnapshot {
                next_events: records
                    .upcoming_events
                    .iter()
                    .map(|e| format!("{} à {} ({})", e.titre, e.debut.format("%H:%M"), e.kind))
                    .collect(),
                is_busy_today: events_today > BUSY_DAY_EVENTS,
            },
            work: WorkSnapshot {
                active_projects_count: records.active_projects.len(),
                urgent_projects: records
                    .active_projects
                    .iter()
                    .filter(|p| p.has_task_due_before(deadline))
                    .map(|p| p.titre.clone())
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenuLine {
    pub libelle: String,
    pub montant: f64,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepenseLine {
    pub libelle: String,
    pub montant: f64,
    pub categorie: String,
    pub date: String,
}

/// Income and expenses of a month and the months before it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceContext {
    pub current_month: String,
    pub revenus: Vec<RevenuLine>,
    pub depenses: Vec<DepenseLine>,
}

impl FinanceContext {
    pub fn build(month: u32, year: i32, revenus: &[Revenu], depenses: &[Depense]) -> Self {
        Self {
            current_month: format!("{}/{}", month, year),
            revenus: revenus
                .iter()
                .map(|r| RevenuLine {
                    libelle: r.libelle.clone(),
                    montant: r.montant,
                    date: format!("{}/{}", r.mois, r.annee),
                })
                .collect(),
            depenses: depenses
                .iter()
                .map(|d| DepenseLine {
                    libelle: d.libelle.clone(),
                    montant: d.montant,
                    categorie: d.categorie.clone(),
                    date: d.date.format("%d/%m/%Y").to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TacheProjet;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 13, 8, 0, 0).unwrap()
    }

    fn account(name: &str, kind: &str, balance: f64) -> Account {
        Account {
            id: name.into(),
            user_id: "u".into(),
            name: name.into(),
            kind: kind.into(),
            balance,
            color: String::new(),
            last_sync: now(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn event(titre: &str, hours_from_now: i64) -> Evenement {
        let debut = now() + Duration::hours(hours_from_now);
        Evenement {
            id: titre.into(),
            user_id: "u".into(),
            titre: titre.into(),
            debut,
            fin: debut + Duration::hours(1),
            lieu: String::new(),
            kind: "cours".into(),
            source: "manual".into(),
            template_id: None,
            ics_uid: None,
            couleur: None,
            created_at: now(),
        }
    }

    fn projet(titre: &str, due_in_days: Option<i64>) -> Projet {
        Projet {
            id: titre.into(),
            user_id: "u".into(),
            titre: titre.into(),
            description: None,
            categorie: "perso".into(),
            statut: "actif".into(),
            date_debut: now(),
            date_fin_prevue: None,
            taches: vec![TacheProjet {
                id: "t".into(),
                titre: "Rendu".into(),
                statut: "a_faire".into(),
                date_limite: due_in_days.map(|d| now() + Duration::days(d)),
            }],
            couleur: "#10B981".into(),
        }
    }

    fn records() -> LifeRecords {
        LifeRecords {
            accounts: vec![
                account("Courant", "Principal", 1200.0),
                account("Livret A", "Épargne", 5000.0),
                account("Poche", "Cash", 40.0),
            ],
            recent_transactions: Vec::new(),
            last_workout: None,
            workouts_last_week: 0,
            upcoming_events: vec![event("Maths", 1), event("Physique", 3), event("Anglais", 5), event("Sport", 30)],
            active_projects: vec![projet("TP", Some(3)), projet("App", Some(20)), projet("Blog", None)],
        }
    }

    #[test]
    fn test_liquidity_counts_liquid_accounts_only() {
        let context = LifeContext::build(now(), &records());
        assert_eq!(context.finance.total_liquidity, 1240.0);
        assert_eq!(context.finance.accounts[1], "Livret A: 5000€");
    }

    #[test]
    fn test_calendar_and_work_sections() {
        let context = LifeContext::build(now(), &records());
        assert_eq!(context.calendar.next_events[0], "Maths à 09:00 (cours)");
        assert!(context.calendar.is_busy_today);
        assert_eq!(context.work.active_projects_count, 3);
        assert_eq!(context.work.urgent_projects, vec!["TP".to_string()]);
        assert_eq!(context.health.last_workout, "Aucune séance récente");
    }

    #[test]
    fn test_finance_context_serializes_camel_case() {
        let value = serde_json::to_value(FinanceContext::build(1, 2024, &[], &[])).unwrap();
        assert_eq!(value["currentMonth"], "1/2024");
        assert!(value["depenses"].as_array().unwrap().is_empty());
    }
}
