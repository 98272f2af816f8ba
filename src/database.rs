//! SQLite pool setup and plain-SQL migrations.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::{fs, path::Path, sync::Arc};

const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Open the SQLite pool, creating the database file's parent directory if
/// needed.
pub async fn connect(database_url: &str) -> Result<Arc<Pool<Sqlite>>> {
    if !database_url.contains(":memory:") {
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("file:");

        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                tracing::info!("created database directory {:?}", parent);
            }
        }

        // Touch the file so SQLx can open it without create-mode URL options.
        if !Path::new(db_path).exists() {
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(db_path)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

/// Apply the embedded schema, statement by statement. Statements are
/// idempotent (`CREATE ... IF NOT EXISTS`), so re-running is safe.
pub async fn run_migrations(db: &Pool<Sqlite>) -> Result<()> {
    let statements = INIT_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("running {} migration statements", statements.len());

    for stmt in statements {
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
