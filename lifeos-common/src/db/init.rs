//! Database initialization
//!
//! Creates the database file on first run, applies connection pragmas and makes sure
//! every table exists before migrations run.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the database at `db_path` and bring its schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets readers proceed while a request writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database with the full schema (used by tests)
///
/// The pool never recycles its connection since that would discard the database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Create every table (idempotent) and run pending migrations
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    create_schema_version_table(pool).await?;
    create_users_table(pool).await?;

    // Finance
    create_accounts_table(pool).await?;
    create_transactions_table(pool).await?;
    create_depenses_table(pool).await?;
    create_revenus_table(pool).await?;
    create_notifications_table(pool).await?;

    // Agenda
    create_evenements_table(pool).await?;
    create_templates_evenements_table(pool).await?;
    create_taches_table(pool).await?;

    // Cuisine
    create_recettes_table(pool).await?;
    create_plannings_semaine_table(pool).await?;
    create_listes_courses_table(pool).await?;

    // Life tracking
    create_projets_table(pool).await?;
    create_seances_sport_table(pool).await?;
    create_habitudes_table(pool).await?;
    create_humeurs_table(pool).await?;
    create_documents_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            two_factor_secret TEXT,
            two_factor_enabled INTEGER NOT NULL DEFAULT 0,
            reset_password_token TEXT,
            reset_password_expire TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_accounts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            type TEXT NOT NULL DEFAULT 'Principal',
            balance REAL NOT NULL DEFAULT 0,
            color TEXT NOT NULL,
            last_sync TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_user ON accounts(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_transactions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            account_id TEXT NOT NULL,
            title TEXT NOT NULL,
            amount REAL NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('CREDIT', 'DEBIT')),
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            is_simulation INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_depenses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS depenses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            libelle TEXT NOT NULL,
            montant REAL NOT NULL,
            categorie TEXT NOT NULL DEFAULT 'Divers',
            date TEXT NOT NULL,
            mois INTEGER NOT NULL,
            annee INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_depenses_period ON depenses(user_id, annee, mois)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_revenus_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS revenus (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            libelle TEXT NOT NULL,
            montant REAL NOT NULL,
            mois INTEGER NOT NULL,
            annee INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_revenus_period ON revenus(user_id, annee, mois)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_notifications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            type TEXT NOT NULL CHECK (type IN ('budget_alert', 'bill_reminder', 'system')),
            message TEXT NOT NULL,
            read INTEGER NOT NULL DEFAULT 0,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_evenements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evenements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            debut TEXT NOT NULL,
            fin TEXT NOT NULL,
            lieu TEXT NOT NULL DEFAULT '',
            type TEXT NOT NULL DEFAULT 'cours',
            source TEXT NOT NULL DEFAULT 'manual' CHECK (source IN ('ics', 'template', 'manual')),
            template_id TEXT,
            ics_uid TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_evenements_debut ON evenements(user_id, debut)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_templates_evenements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS templates_evenements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            jour_semaine INTEGER NOT NULL CHECK (jour_semaine BETWEEN 0 AND 6),
            heure_debut TEXT NOT NULL,
            duree_minutes INTEGER NOT NULL,
            lieu TEXT NOT NULL DEFAULT '',
            type TEXT NOT NULL DEFAULT 'cours',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_taches_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS taches (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            terminee INTEGER NOT NULL DEFAULT 0,
            date_echeance TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_recettes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recettes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            type TEXT NOT NULL DEFAULT 'Déjeuner',
            image TEXT,
            ingredients TEXT NOT NULL DEFAULT '[]',
            etapes TEXT NOT NULL DEFAULT '[]',
            duree_minutes INTEGER,
            cuisson_minutes INTEGER NOT NULL DEFAULT 0,
            calories REAL,
            proteines REAL,
            glucides REAL,
            lipides REAL,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            last_cooked TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_plannings_semaine_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plannings_semaine (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date_debut TEXT NOT NULL,
            slots TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            UNIQUE (user_id, date_debut)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_listes_courses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listes_courses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            items TEXT NOT NULL DEFAULT '[]',
            date_generation TEXT NOT NULL,
            total_estime REAL,
            source_planning_id TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_projets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projets (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            description TEXT,
            categorie TEXT NOT NULL DEFAULT 'perso',
            statut TEXT NOT NULL DEFAULT 'actif',
            date_debut TEXT NOT NULL,
            date_fin_prevue TEXT,
            taches TEXT NOT NULL DEFAULT '[]',
            couleur TEXT NOT NULL DEFAULT '#10B981'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_seances_sport_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS seances_sport (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            date TEXT NOT NULL,
            type TEXT NOT NULL,
            split_name TEXT NOT NULL DEFAULT 'OTHER',
            duree_totale INTEGER,
            exercices TEXT NOT NULL DEFAULT '[]',
            ressenti INTEGER CHECK (ressenti IS NULL OR ressenti BETWEEN 1 AND 10),
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_habitudes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS habitudes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            frequence TEXT NOT NULL DEFAULT 'quotidien',
            objectif REAL NOT NULL DEFAULT 1,
            unite TEXT,
            historique TEXT NOT NULL DEFAULT '[]',
            couleur TEXT NOT NULL DEFAULT '#3B82F6',
            date_creation TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_humeurs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS humeurs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            niveau INTEGER NOT NULL CHECK (niveau BETWEEN 1 AND 5),
            tags TEXT NOT NULL DEFAULT '[]',
            note TEXT,
            UNIQUE (user_id, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            titre TEXT NOT NULL,
            categorie TEXT NOT NULL DEFAULT 'autre',
            date_expiration TEXT,
            chemin_fichier TEXT,
            notes TEXT,
            date_ajout TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
