// biudzetas/src/models/entry.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Entry {
  pub id: i64,
  /// Set on creation and refreshed on every edit.
  pub recorded_at: DateTime<Utc>,
  pub message: String,
  pub user_id: i64,
}

impl Entry {
  pub fn recorded_at_display(&self) -> String {
    self.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string()
  }
}
