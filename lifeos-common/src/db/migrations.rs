//! Database schema migrations
//!
//! Versions are recorded in the `schema_version` table. Every migration is idempotent:
//! it inspects the live schema before altering it, so re-running against an already
//! upgraded database is harmless.
//!
//! Never edit a released migration; add a new `migrate_vN` and bump
//! [`CURRENT_SCHEMA_VERSION`].

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 4;

/// Latest applied version, 0 for a fresh database
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({}), continuing",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("Migration v3 completed");
    }

    if current_version < 4 {
        migrate_v4(pool).await?;
        set_schema_version(pool, 4).await?;
        info!("Migration v4 completed");
    }

    Ok(())
}

/// Migration v1: baseline schema, created by `init_schema`
async fn migrate_v1(_pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: baseline schema");
    Ok(())
}

/// Migration v2: optional display color on calendar events
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: add couleur column to evenements");

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('evenements') WHERE name = 'couleur'",
    )
    .fetch_one(pool)
    .await?;

    if has_column == 0 {
        sqlx::query("ALTER TABLE evenements ADD COLUMN couleur TEXT")
            .execute(pool)
            .await?;
        info!("Migration v2: added couleur to evenements");
    } else {
        info!("Migration v2: couleur already present, skipping");
    }

    Ok(())
}

/// Migration v3: index backing the "newest transactions first" listings
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: index transactions by user and date");

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v4: transactions outlive their account
///
/// Early databases declared `account_id` with `ON DELETE CASCADE`, so re-syncing
/// accounts wiped the history. SQLite cannot drop a constraint in place; the table
/// is rebuilt.
async fn migrate_v4(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v4: detach transactions from account deletion");

    let cascades: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_foreign_key_list('transactions') WHERE \"table\" = 'accounts'",
    )
    .fetch_one(pool)
    .await?;

    if cascades == 0 {
        info!("Migration v4: no account foreign key on transactions, skipping");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE transactions_v4 (
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
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO transactions_v4 (id, user_id, account_id, title, amount, type, category, date,
                                     is_recurring, is_simulation, created_at, updated_at)
        SELECT id, user_id, account_id, title, amount, type, category, date,
               is_recurring, is_simulation, created_at, updated_at
        FROM transactions
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("DROP TABLE transactions").execute(&mut *tx).await?;
    sqlx::query("ALTER TABLE transactions_v4 RENAME TO transactions")
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date DESC)",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Migration v4: rebuilt transactions without account cascade");
    Ok(())
}
