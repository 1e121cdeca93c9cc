//! Demonstration records loaded by the `seed` and `sync` endpoints
//!
//! Dates are relative to the time of the call so the dashboard always has
//! something upcoming and something recent to show.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use lifeos_common::dates::at_time;

use crate::models::{
    new_id, Account, Evenement, Exercice, Ingredient, Projet, Recette, SeanceSport, TacheProjet,
};

/// `(name, type, balance, color)`
const DEMO_ACCOUNTS: [(&str, &str, f64, &str); 4] = [
    ("Compte Principal", "Principal", 1450.50, "from-blue-600 to-blue-900"),
    ("Revolut", "Quotidien", 42.10, "from-fuchsia-600 to-purple-900"),
    ("Livret A", "Épargne", 12000.0, "from-emerald-600 to-teal-900"),
    ("PEA", "Investissement", 4500.80, "from-amber-500 to-orange-700"),
];

pub fn demo_accounts(user_id: &str, now: DateTime<Utc>) -> Vec<Account> {
    DEMO_ACCOUNTS
        .iter()
        .enumerate()
        .map(|(i, (name, kind, balance, color))| Account {
            id: new_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            balance: *balance,
            color: color.to_string(),
            last_sync: now,
            // Distinct creation stamps keep the listing order stable
            created_at: now + Duration::milliseconds(i as i64),
            updated_at: now,
        })
        .collect()
}

/// `(titre, days from today, start h:m, end h:m, lieu, type, couleur)`
const DEMO_EVENTS: [(&str, i64, (u32, u32), (u32, u32), &str, &str, &str); 4] = [
    ("Dentiste", 2, (14, 0), (15, 0), "Centre Ville", "rdv", "#3B82F6"),
    ("Anniversaire Sarah", 5, (19, 0), (23, 0), "Le Petit Restaurant", "loisir", "#EC4899"),
    ("Réunion Projet LifeOS", 1, (10, 0), (11, 30), "Bureau", "travail", "#10B981"),
    ("Match de Tennis", 3, (18, 0), (20, 0), "Club Sportif", "sport", "#F59E0B"),
];

pub fn demo_evenements(user_id: &str, now: DateTime<Utc>) -> Vec<Evenement> {
    let today = now.date_naive();
    DEMO_EVENTS
        .iter()
        .filter_map(|(titre, offset, start, end, lieu, kind, couleur)| {
            let day = today + Duration::days(*offset);
            let debut = at_time(day, NaiveTime::from_hms_opt(start.0, start.1, 0)?);
            let fin = at_time(day, NaiveTime::from_hms_opt(end.0, end.1, 0)?);
            Some(Evenement {
                id: new_id(),
                user_id: user_id.to_string(),
                titre: titre.to_string(),
                debut,
                fin,
                lieu: lieu.to_string(),
                kind: kind.to_string(),
                source: "manual".to_string(),
                template_id: None,
                ics_uid: None,
                couleur: Some(couleur.to_string()),
                created_at: now,
            })
        })
        .collect()
}

struct DemoRecette {
    titre: &'static str,
    kind: &'static str,
    image: &'static str,
    ingredients: &'static [(&'static str, &'static str, &'static str)],
    etapes: &'static [&'static str],
    duree_minutes: i64,
    macros: (f64, f64, f64, f64),
}

const DEMO_RECETTES: [DemoRecette; 3] = [
    DemoRecette {
        titre: "Attiéké & Poulet Braisé",
        kind: "Déjeuner",
        image: "https://images.unsplash.com/photo-1598515214211-89d3c73ae83b?q=80&w=2070&auto=format&fit=crop",
        ingredients: &[
            ("Attiéké", "200", "g"),
            ("Cuisse de Poulet", "1", "unité"),
            ("Oignons", "2", ""),
            ("Tomates", "2", ""),
        ],
        etapes: &[
            "Mariner le poulet avec épices, moutarde, ail.",
            "Braiser le poulet au four ou barbecue.",
            "Préparer la sauce moyo (tomates/oignons cubes).",
            "Servir avec l'attiéké.",
        ],
        duree_minutes: 45,
        macros: (650.0, 45.0, 80.0, 20.0),
    },
    DemoRecette {
        titre: "Pâtes Carbonara (Vraie)",
        kind: "Dîner",
        image: "https://images.unsplash.com/photo-1612874742237-6526221588e3?q=80&w=2071&auto=format&fit=crop",
        ingredients: &[
            ("Spaghetti", "150", "g"),
            ("Guanciale (ou Lardons)", "100", "g"),
            ("Jaunes d'oeufs", "3", ""),
            ("Pecorino", "50", "g"),
        ],
        etapes: &[
            "Cuire les pâtes al dente.",
            "Dorer le guanciale à la poêle.",
            "Mélanger jaunes + pecorino + poivre dans un bol.",
            "Mélanger tout HORS DU FEU avec un peu d'eau de cuisson.",
        ],
        duree_minutes: 20,
        macros: (800.0, 35.0, 90.0, 35.0),
    },
    DemoRecette {
        titre: "Bowl Saumon Avocat",
        kind: "Déjeuner",
        image: "https://images.unsplash.com/photo-1512621776951-a57141f2eefd?q=80&w=2070&auto=format&fit=crop",
        ingredients: &[
            ("Riz Complet", "100", "g"),
            ("Pavé Saumon", "1", "unité"),
            ("Avocat", "1/2", ""),
            ("Graines Sésame", "1", "pincée"),
        ],
        etapes: &[
            "Cuire le riz.",
            "Couper le saumon en dés (cru ou poêlé).",
            "Couper l'avocat en lamelles.",
            "Dresser dans un bol.",
        ],
        duree_minutes: 15,
        macros: (550.0, 30.0, 45.0, 25.0),
    },
];

pub fn demo_recettes(user_id: &str, now: DateTime<Utc>) -> Vec<Recette> {
    DEMO_RECETTES
        .iter()
        .enumerate()
        .map(|(i, demo)| {
            let created_at = now - Duration::milliseconds(i as i64);
            Recette {
                id: new_id(),
                user_id: user_id.to_string(),
                titre: demo.titre.to_string(),
                kind: demo.kind.to_string(),
                image: Some(demo.image.to_string()),
                ingredients: demo
                    .ingredients
                    .iter()
                    .map(|(nom, quantite, unite)| Ingredient {
                        nom: nom.to_string(),
                        quantite: quantite.to_string(),
                        unite: unite.to_string(),
                    })
                    .collect(),
                etapes: demo.etapes.iter().map(|e| e.to_string()).collect(),
                duree_minutes: Some(demo.duree_minutes),
                cuisson_minutes: 0,
                calories: Some(demo.macros.0),
                proteines: Some(demo.macros.1),
                glucides: Some(demo.macros.2),
                lipides: Some(demo.macros.3),
                is_favorite: false,
                last_cooked: None,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

/// `(nom, series, repetitions, poids)`
type DemoExercice = (&'static str, i64, &'static str, f64);

/// `(titre, split, days ago, minutes, ressenti, exercices)`
const DEMO_SEANCES: [(&str, &str, i64, i64, i64, [DemoExercice; 3]); 3] = [
    (
        "Explosion Pectoraux",
        "PUSH",
        2,
        65,
        8,
        [
            ("Développé Couché", 4, "10-12", 80.0),
            ("Dips Lestés", 3, "12", 10.0),
            ("Écarté Poulie", 3, "15", 15.0),
        ],
    ),
    (
        "Dos Large & Biceps",
        "PULL",
        4,
        70,
        9,
        [
            ("Tractions", 4, "10", 0.0),
            ("Rowing Barre", 3, "12", 70.0),
            ("Curl Marteau", 3, "12", 18.0),
        ],
    ),
    (
        "Leg Day (Squat Focus)",
        "LEGS",
        6,
        80,
        10,
        [
            ("Squat Arrière", 5, "5-8", 120.0),
            ("Presse à cuisses", 4, "15", 200.0),
            ("Leg Extension", 3, "20", 60.0),
        ],
    ),
];

pub fn demo_seances(user_id: &str, now: DateTime<Utc>) -> Vec<SeanceSport> {
    DEMO_SEANCES
        .iter()
        .map(|(titre, split, days_ago, minutes, ressenti, exercices)| SeanceSport {
            id: new_id(),
            user_id: user_id.to_string(),
            titre: titre.to_string(),
            date: now - Duration::days(*days_ago),
            kind: "musculation".to_string(),
            split_name: split.to_string(),
            duree_totale: Some(*minutes),
            exercices: exercices
                .iter()
                .map(|(nom, series, repetitions, poids)| Exercice {
                    nom: nom.to_string(),
                    series: *series,
                    repetitions: repetitions.to_string(),
                    poids: *poids,
                    duree: None,
                    completed: true,
                    notes: None,
                })
                .collect(),
            ressenti: Some(*ressenti),
            notes: None,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

pub fn demo_projets(user_id: &str, now: DateTime<Utc>) -> Vec<Projet> {
    let tache = |titre: &str, statut: &str, date_limite: Option<DateTime<Utc>>| TacheProjet {
        id: new_id(),
        titre: titre.to_string(),
        statut: statut.to_string(),
        date_limite,
    };
    let projet = |offset: i64, titre: &str, description: &str, categorie: &str, couleur: &str, taches: Vec<TacheProjet>| Projet {
        id: new_id(),
        user_id: user_id.to_string(),
        titre: titre.to_string(),
        description: Some(description.to_string()),
        categorie: categorie.to_string(),
        statut: "actif".to_string(),
        date_debut: now - Duration::milliseconds(offset),
        date_fin_prevue: None,
        taches,
        couleur: couleur.to_string(),
    };

    vec![
        projet(
            0,
            "LifeOS App V1",
            "Développement de l'application de gestion personnelle ultime.",
            "perso",
            "#3B82F6",
            vec![
                tache("Phase 12: Data Architecture", "termine", None),
                tache("Phase 13: Cuisine Redesign", "termine", None),
                tache("Phase 14: Dynamic Projects", "en_cours", None),
            ],
        ),
        projet(
            1,
            "Voyage Japon 2026",
            "Préparation du voyage d'un mois à Tokyo et Kyoto.",
            "perso",
            "#EC4899",
            vec![
                tache("Acheter Billets", "termine", None),
                tache("Réserver Ryokan Kyoto", "a_faire", None),
                tache("Liste itinéraire", "en_cours", None),
            ],
        ),
        projet(
            2,
            "Master MIAGE",
            "Suivi des cours et projets universitaires.",
            "etudes",
            "#10B981",
            vec![
                tache("Rendu Projet Web", "a_faire", Some(now + Duration::days(7))),
                tache("Réviser Partiels", "a_faire", None),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_demo_events_are_upcoming() {
        let now = Utc.with_ymd_and_hms(2024, 5, 13, 9, 0, 0).unwrap();
        let events = demo_evenements("u", now);
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.debut > now && e.fin > e.debut));
        let reunion = events.iter().find(|e| e.titre == "Réunion Projet LifeOS").unwrap();
        assert_eq!(reunion.debut, Utc.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap());
        assert_eq!(reunion.fin, Utc.with_ymd_and_hms(2024, 5, 14, 11, 30, 0).unwrap());
    }

    #[test]
    fn test_demo_projects_progress() {
        let projets = demo_projets("u", Utc::now());
        let progress: Vec<u32> = projets.iter().map(|p| p.progression()).collect();
        assert_eq!(progress, vec![67, 33, 0]);
    }

    #[test]
    fn test_demo_sessions_are_in_the_past() {
        let now = Utc::now();
        let seances = demo_seances("u", now);
        assert_eq!(seances.len(), 3);
        assert!(seances.iter().all(|s| s.date < now && s.exercices.iter().all(|e| e.completed)));
    }
}
