// biudzetas/src/state.rs
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::signing::Signer;
use sqlx::SqlitePool;
use std::sync::Arc;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: SqlitePool,
  pub config: Arc<AppConfig>, // Share loaded config
  pub templates: Arc<Tera>,
  pub signer: Signer,
}

impl AppState {
  pub fn new(db_pool: SqlitePool, config: Arc<AppConfig>, templates: Tera) -> Result<Self> {
    let signer = Signer::new(config.secret_key.as_bytes())
      .map_err(|e| AppError::Config(format!("SECRET_KEY cannot be used as a signing key: {}", e)))?;
    Ok(Self {
      db_pool,
      config,
      templates: Arc::new(templates),
      signer,
    })
  }
}
