// biudzetas/src/lib.rs

//! Biudžetas: a small personal journal. Users register, log in and keep short dated
//! entries ("įrašai") behind a signed session cookie. Pages are rendered on the server.

pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod models;
pub mod services;
pub mod state;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;

use std::sync::Arc;

/// Connects to the configured database, creates the schema and loads the templates.
pub async fn build_state(config: Arc<AppConfig>) -> Result<AppState> {
  let db_pool = db::connect(&config.database_url, config.database_max_connections).await?;
  db::init_schema(&db_pool).await?;
  let templates = web::views::load_templates()?;
  AppState::new(db_pool, config, templates)
}
