//! Bank accounts, transactions, monthly expenses and income, notifications

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;

pub const ACCOUNT_TYPES: [&str; 5] = ["Principal", "Quotidien", "Épargne", "Investissement", "Cash"];

/// Account types counted as available cash
pub const LIQUID_ACCOUNT_TYPES: [&str; 3] = ["Principal", "Quotidien", "Cash"];

pub const DEFAULT_ACCOUNT_COLOR: &str = "from-slate-500/20 to-slate-900/40";

pub const TRANSACTION_TYPES: [&str; 2] = ["CREDIT", "DEBIT"];

pub const TRANSACTION_CATEGORIES: [&str; 11] = [
    "Logement",
    "Transport",
    "Alimentation",
    "Loisirs",
    "Santé",
    "Education",
    "Shopping",
    "Services",
    "Epargne",
    "Salaire",
    "Autre",
];

pub const NOTIFICATION_TYPES: [&str; 3] = ["budget_alert", "bill_reminder", "system"];

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub balance: f64,
    pub color: String,
    pub last_sync: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub account_id: String,
    pub title: String,
    pub amount: f64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub is_simulation: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Signed effect on the account balance
    pub fn balance_delta(&self) -> f64 {
        if self.kind == "CREDIT" {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Account fields joined onto a listed transaction
#[derive(Debug, Clone, Serialize)]
pub struct AccountRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithAccount {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub account: Option<AccountRef>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Depense {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub libelle: String,
    pub montant: f64,
    pub categorie: String,
    pub date: DateTime<Utc>,
    pub mois: i64,
    pub annee: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Revenu {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    pub libelle: String,
    pub montant: f64,
    pub mois: i64,
    pub annee: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub user_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub read: bool,
    #[sqlx(json)]
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}
