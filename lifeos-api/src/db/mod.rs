//! Per-entity database operations
//!
//! Every query is scoped by the owning user id.

pub mod accounts;
pub mod depenses;
pub mod documents;
pub mod evenements;
pub mod habitudes;
pub mod humeurs;
pub mod listes;
pub mod notifications;
pub mod plannings;
pub mod projets;
pub mod recettes;
pub mod revenus;
pub mod seances;
pub mod taches;
pub mod templates;
pub mod transactions;
pub mod users;
