// biudzetas/src/db.rs

//! Connection pool setup and schema bootstrap for the SQLite database.

use crate::errors::Result as AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{info, instrument};

// Applied in order on every startup; each statement is idempotent.
const SCHEMA: &[&str] = &[
  "CREATE TABLE IF NOT EXISTS users (
     id INTEGER PRIMARY KEY AUTOINCREMENT,
     name TEXT NOT NULL UNIQUE,
     email TEXT NOT NULL UNIQUE,
     image_file TEXT NOT NULL DEFAULT 'default.jpg',
     password_hash TEXT NOT NULL
   )",
  "CREATE TABLE IF NOT EXISTS entries (
     id INTEGER PRIMARY KEY AUTOINCREMENT,
     recorded_at TEXT NOT NULL,
     message TEXT NOT NULL,
     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
   )",
  "CREATE INDEX IF NOT EXISTS ix_entries_recorded_at ON entries(recorded_at)",
  "CREATE INDEX IF NOT EXISTS ix_entries_user_id ON entries(user_id)",
];

/// Opens a pool for `database_url`, creating the database file if needed.
///
/// `sqlite::memory:` databases live per connection, so callers using one should pass
/// `max_connections = 1`.
#[instrument(name = "db::connect", skip(database_url))]
pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<SqlitePool> {
  let options = SqliteConnectOptions::from_str(database_url)?
    .create_if_missing(true)
    .foreign_keys(true);

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    // Keep the single in-memory connection alive for the lifetime of the pool.
    .idle_timeout(None)
    .max_lifetime(None)
    .connect_with(options)
    .await?;

  info!(max_connections, "Database pool opened.");
  Ok(pool)
}

#[instrument(name = "db::init_schema", skip(pool))]
pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
  for statement in SCHEMA {
    sqlx::query(statement).execute(pool).await?;
  }
  info!("Database schema is up to date.");
  Ok(())
}

/// Cheap liveness probe used by the health check.
pub async fn ping(pool: &SqlitePool) -> AppResult<()> {
  sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await?;
  Ok(())
}
