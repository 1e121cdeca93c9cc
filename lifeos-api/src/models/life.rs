//! Projects, workouts, habits, mood journal and administrative documents

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PROJET_CATEGORIES: [&str; 3] = ["etudes", "business", "perso"];
pub const PROJET_STATUTS: [&str; 3] = ["actif", "en_pause", "termine"];
pub const TACHE_PROJET_STATUTS: [&str; 3] = ["a_faire", "en_cours", "termine"];
pub const DEFAULT_PROJET_COLOR: &str = "#10B981";

pub const SEANCE_TYPES: [&str; 5] = ["musculation", "cardio", "flexibilite", "sport_collectif", "autre"];
pub const SPLIT_NAMES: [&str; 8] = [
    "PUSH",
    "PULL",
    "LEGS",
    "UPPER",
    "LOWER",
    "FULL_BODY",
    "CARDIO",
    "OTHER",
];

pub const HABITUDE_FREQUENCES: [&str; 2] = ["quotidien", "hebdomadaire"];
pub const DEFAULT_HABITUDE_COLOR: &str = "#3B82F6";

pub const DOCUMENT_CATEGORIES: [&str; 5] = ["logement", "sante", "etudes", "admin", "autre"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacheProjet {
    #[serde(rename = "_id")]
    pub id: String,
    pub titre: String,
    pub statut: String,
    #[serde(default)]
    pub date_limite: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Projet {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    pub description: Option<String>,
    pub categorie: String,
    pub statut: String,
    pub date_debut: DateTime<Utc>,
    pub date_fin_prevue: Option<DateTime<Utc>>,
    #[sqlx(json)]
    pub taches: Vec<TacheProjet>,
    pub couleur: String,
}

impl Projet {
    /// Percentage of tasks done, rounded; 0 without tasks
    pub fn progression(&self) -> u32 {
        if self.taches.is_empty() {
            return 0;
        }
        let done = self.taches.iter().filter(|t| t.statut == "termine").count();
        ((done as f64 / self.taches.len() as f64) * 100.0).round() as u32
    }

    /// True when an unfinished task is due before `deadline`
    pub fn has_task_due_before(&self, deadline: DateTime<Utc>) -> bool {
        self.taches
            .iter()
            .any(|t| t.statut != "termine" && t.date_limite.map(|d| d < deadline).unwrap_or(false))
    }
}

/// Project with its derived completion percentage
#[derive(Debug, Clone, Serialize)]
pub struct ProjetView {
    #[serde(flatten)]
    pub projet: Projet,
    pub progression: u32,
}

impl From<Projet> for ProjetView {
    fn from(projet: Projet) -> Self {
        let progression = projet.progression();
        Self { projet, progression }
    }
}

fn default_series() -> i64 {
    3
}

fn default_repetitions() -> String {
    "10-12".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercice {
    pub nom: String,
    #[serde(default = "default_series")]
    pub series: i64,
    #[serde(default = "default_repetitions")]
    pub repetitions: String,
    #[serde(default)]
    pub poids: f64,
    #[serde(default)]
    pub duree: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SeanceSport {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    pub date: DateTime<Utc>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub split_name: String,
    pub duree_totale: Option<i64>,
    #[sqlx(json)]
    pub exercices: Vec<Exercice>,
    pub ressenti: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoriqueEntry {
    pub date: NaiveDate,
    pub valeur: f64,
    pub est_complete: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Habitude {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    pub frequence: String,
    pub objectif: f64,
    pub unite: Option<String>,
    #[sqlx(json)]
    pub historique: Vec<HistoriqueEntry>,
    pub couleur: String,
    pub date_creation: DateTime<Utc>,
}

impl Habitude {
    /// Insert or overwrite the entry for `date`
    pub fn record(&mut self, date: NaiveDate, valeur: f64) {
        let est_complete = valeur >= self.objectif;
        match self.historique.iter_mut().find(|h| h.date == date) {
            Some(entry) => {
                entry.valeur = valeur;
                entry.est_complete = est_complete;
            }
            None => self.historique.push(HistoriqueEntry {
                date,
                valeur,
                est_complete,
            }),
        }
    }

    /// Consecutive completed days ending `today`, or yesterday when today is not done yet
    pub fn streak(&self, today: NaiveDate) -> u32 {
        let completed = |day: NaiveDate| {
            self.historique
                .iter()
                .any(|h| h.date == day && h.est_complete)
        };

        let mut day = if completed(today) {
            today
        } else {
            match today.pred_opt() {
                Some(yesterday) => yesterday,
                None => return 0,
            }
        };

        let mut streak = 0;
        while completed(day) {
            streak += 1;
            day = match day.pred_opt() {
                Some(previous) => previous,
                None => break,
            };
        }
        streak
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitudeView {
    #[serde(flatten)]
    pub habitude: Habitude,
    pub streak: u32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Humeur {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub date: NaiveDate,
    pub niveau: i64,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub titre: String,
    pub categorie: String,
    pub date_expiration: Option<DateTime<Utc>>,
    pub chemin_fichier: Option<String>,
    pub notes: Option<String>,
    pub date_ajout: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn habitude(objectif: f64) -> Habitude {
        Habitude {
            id: "h".into(),
            user_id: "u".into(),
            titre: "Lire".into(),
            frequence: "quotidien".into(),
            objectif,
            unite: Some("pages".into()),
            historique: Vec::new(),
            couleur: DEFAULT_HABITUDE_COLOR.into(),
            date_creation: Utc::now(),
        }
    }

    fn tache(statut: &str, date_limite: Option<DateTime<Utc>>) -> TacheProjet {
        TacheProjet {
            id: "t".into(),
            titre: "x".into(),
            statut: statut.into(),
            date_limite,
        }
    }

    #[test]
    fn test_record_overwrites_same_day() {
        let mut h = habitude(10.0);
        h.record(d(2024, 5, 1), 4.0);
        h.record(d(2024, 5, 1), 12.0);
        assert_eq!(h.historique.len(), 1);
        assert_eq!(h.historique[0].valeur, 12.0);
        assert!(h.historique[0].est_complete);
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let mut h = habitude(1.0);
        h.record(d(2024, 5, 10), 1.0);
        h.record(d(2024, 5, 9), 1.0);
        h.record(d(2024, 5, 8), 0.0);
        h.record(d(2024, 5, 7), 1.0);
        assert_eq!(h.streak(d(2024, 5, 10)), 2);
    }

    #[test]
    fn test_streak_tolerates_today_not_done_yet() {
        let mut h = habitude(1.0);
        h.record(d(2024, 5, 9), 2.0);
        h.record(d(2024, 5, 8), 1.0);
        assert_eq!(h.streak(d(2024, 5, 10)), 2);
        assert_eq!(h.streak(d(2024, 5, 12)), 0);
    }

    #[test]
    fn test_progression() {
        let mut projet = Projet {
            id: "p".into(),
            user_id: "u".into(),
            titre: "LifeOS".into(),
            description: None,
            categorie: "perso".into(),
            statut: "actif".into(),
            date_debut: Utc::now(),
            date_fin_prevue: None,
            taches: Vec::new(),
            couleur: DEFAULT_PROJET_COLOR.into(),
        };
        assert_eq!(projet.progression(), 0);

        projet.taches = vec![
            tache("termine", None),
            tache("termine", None),
            tache("en_cours", None),
        ];
        assert_eq!(projet.progression(), 67);
    }

    #[test]
    fn test_task_due_ignores_finished_tasks() {
        let now = Utc::now();
        let soon = now + chrono::Duration::days(2);
        let mut projet_taches = vec![tache("termine", Some(soon))];
        let mut projet = Projet {
            id: "p".into(),
            user_id: "u".into(),
            titre: "Master".into(),
            description: None,
            categorie: "etudes".into(),
            statut: "actif".into(),
            date_debut: now,
            date_fin_prevue: None,
            taches: projet_taches.clone(),
            couleur: DEFAULT_PROJET_COLOR.into(),
        };
        let deadline = now + chrono::Duration::days(7);
        assert!(!projet.has_task_due_before(deadline));

        projet_taches.push(tache("a_faire", Some(soon)));
        projet.taches = projet_taches;
        assert!(projet.has_task_due_before(deadline));
    }
}
