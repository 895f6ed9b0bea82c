// biudzetas/src/services/entry_service.rs

//! Entry persistence. Every lookup that can change or remove a row is scoped to the
//! owning user, so another account's entry id behaves exactly like a missing one.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::models::Entry;

const ENTRY_COLUMNS: &str = "id, recorded_at, message, user_id";

fn clean_message(message: &str) -> AppResult<String> {
  let trimmed = message.trim();
  if trimmed.is_empty() {
    return Err(AppError::Validation("Įrašas negali būti tuščias.".to_string()));
  }
  Ok(trimmed.to_string())
}

#[instrument(name = "entry_service::list_entries_for_user", skip(pool))]
pub async fn list_entries_for_user(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Entry>> {
  let entries = sqlx::query_as::<_, Entry>(&format!(
    "SELECT {} FROM entries WHERE user_id = ? ORDER BY id ASC",
    ENTRY_COLUMNS
  ))
  .bind(user_id)
  .fetch_all(pool)
  .await?;
  Ok(entries)
}

#[instrument(name = "entry_service::count_entries_for_user", skip(pool))]
pub async fn count_entries_for_user(pool: &SqlitePool, user_id: i64) -> AppResult<i64> {
  let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entries WHERE user_id = ?")
    .bind(user_id)
    .fetch_one(pool)
    .await?;
  Ok(count)
}

#[instrument(name = "entry_service::create_entry", skip(pool, message))]
pub async fn create_entry(pool: &SqlitePool, user_id: i64, message: &str, now: DateTime<Utc>) -> AppResult<Entry> {
  let message = clean_message(message)?;
  let entry = sqlx::query_as::<_, Entry>(&format!(
    "INSERT INTO entries (recorded_at, message, user_id) VALUES (?, ?, ?) RETURNING {}",
    ENTRY_COLUMNS
  ))
  .bind(now)
  .bind(&message)
  .bind(user_id)
  .fetch_one(pool)
  .await?;

  info!(entry_id = entry.id, "Entry created.");
  Ok(entry)
}

/// Fetches an entry only if it belongs to `user_id`.
#[instrument(name = "entry_service::find_owned_entry", skip(pool))]
pub async fn find_owned_entry(pool: &SqlitePool, user_id: i64, entry_id: i64) -> AppResult<Option<Entry>> {
  let entry = sqlx::query_as::<_, Entry>(&format!(
    "SELECT {} FROM entries WHERE id = ? AND user_id = ?",
    ENTRY_COLUMNS
  ))
  .bind(entry_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?;
  Ok(entry)
}

/// Replaces the message and re-stamps the entry. `NotFound` when the entry is missing or
/// owned by someone else.
#[instrument(name = "entry_service::update_entry", skip(pool, message))]
pub async fn update_entry(
  pool: &SqlitePool,
  user_id: i64,
  entry_id: i64,
  message: &str,
  now: DateTime<Utc>,
) -> AppResult<Entry> {
  let message = clean_message(message)?;
  let updated = sqlx::query_as::<_, Entry>(&format!(
    "UPDATE entries SET message = ?, recorded_at = ? WHERE id = ? AND user_id = ? RETURNING {}",
    ENTRY_COLUMNS
  ))
  .bind(&message)
  .bind(now)
  .bind(entry_id)
  .bind(user_id)
  .fetch_optional(pool)
  .await?;

  match updated {
    Some(entry) => {
      info!("Entry updated.");
      Ok(entry)
    }
    None => {
      warn!("Update of missing or foreign entry refused.");
      Err(AppError::NotFound(format!("Įrašas {} nerastas.", entry_id)))
    }
  }
}

#[instrument(name = "entry_service::delete_entry", skip(pool))]
pub async fn delete_entry(pool: &SqlitePool, user_id: i64, entry_id: i64) -> AppResult<()> {
  let result = sqlx::query("DELETE FROM entries WHERE id = ? AND user_id = ?")
    .bind(entry_id)
    .bind(user_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    warn!("Delete of missing or foreign entry refused.");
    return Err(AppError::NotFound(format!("Įrašas {} nerastas.", entry_id)));
  }
  info!("Entry deleted.");
  Ok(())
}
