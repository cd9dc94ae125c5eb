use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use sqlx_migrator::{Migrate, Plan};
use std::path::Path;
use std::str::FromStr;
use tracing::log::LevelFilter;

/// WAL journaling, a busy timeout, and in-memory temp tables.
async fn configure_pragmas(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA temp_store = memory")
        .execute(pool)
        .await?;

    Ok(())
}

/// Read-only pool for the readiness probe and ledger lookups.
pub async fn create_read_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .read_only(true)
        .log_statements(LevelFilter::Debug);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    configure_pragmas(&pool).await?;

    tracing::info!(
        "Created read-only pool with {} max connections",
        max_connections
    );

    Ok(pool)
}

/// Single-connection pool; every ledger write goes through it.
pub async fn create_write_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .log_statements(LevelFilter::Debug);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    configure_pragmas(&pool).await?;

    tracing::info!("Created read-write pool with 1 max connection");

    Ok(pool)
}

/// Applies every pending ledger migration.
pub async fn migrate(database_url: &str) -> Result<()> {
    let pool = create_write_pool(database_url).await?;
    let mut conn = pool.acquire().await?;

    lunchbook_db::migrator()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    drop(conn);
    pool.close().await;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

/// Deletes the database file, then migrates from scratch.
pub async fn reset(database_url: &str) -> Result<()> {
    let options = SqliteConnectOptions::from_str(database_url)?;
    let filename = options.get_filename();

    if filename != Path::new(":memory:") && filename.exists() {
        std::fs::remove_file(filename)?;
        tracing::warn!("Dropped database: {}", filename.display());
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate(database_url).await
}
