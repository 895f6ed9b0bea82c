// biudzetas/src/config.rs

use crate::errors::{AppError, Result};
use chrono::Duration;
use dotenvy::dotenv;
use std::env;

/// Minimum accepted length of `SECRET_KEY`, in bytes.
pub const MIN_SECRET_KEY_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub app_base_url: String,

  // Key for session cookies and password reset tokens
  pub secret_key: String,
  pub reset_token_max_age: Duration,
  pub remember_cookie_duration: Duration,
  pub cookie_secure: bool,

  pub mail_sender: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL").unwrap_or_else(|_| "sqlite://biudzetas.db".to_string());
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "5".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

    let secret_key = get_env("SECRET_KEY")?;
    if secret_key.len() < MIN_SECRET_KEY_LEN {
      return Err(AppError::Config(format!(
        "SECRET_KEY must be at least {} bytes long",
        MIN_SECRET_KEY_LEN
      )));
    }

    let reset_token_max_age_secs = get_env("RESET_TOKEN_MAX_AGE_SECS")
      .unwrap_or_else(|_| "1800".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid RESET_TOKEN_MAX_AGE_SECS: {}", e)))?;
    let remember_cookie_days = get_env("REMEMBER_COOKIE_DAYS")
      .unwrap_or_else(|_| "365".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid REMEMBER_COOKIE_DAYS: {}", e)))?;
    if reset_token_max_age_secs <= 0 || remember_cookie_days <= 0 {
      return Err(AppError::Config(
        "RESET_TOKEN_MAX_AGE_SECS and REMEMBER_COOKIE_DAYS must be positive".to_string(),
      ));
    }

    let reset_token_max_age = Duration::try_seconds(reset_token_max_age_secs)
      .ok_or_else(|| AppError::Config("RESET_TOKEN_MAX_AGE_SECS is out of range".to_string()))?;
    let remember_cookie_duration = Duration::try_days(remember_cookie_days)
      .ok_or_else(|| AppError::Config("REMEMBER_COOKIE_DAYS is out of range".to_string()))?;

    let cookie_secure = get_env("COOKIE_SECURE")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid COOKIE_SECURE value: {}", e)))?;
    let mail_sender = get_env("MAIL_SENDER").unwrap_or_else(|_| "noreply@biudzetas.lt".to_string());

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      app_base_url,
      secret_key,
      reset_token_max_age,
      remember_cookie_duration,
      cookie_secure,
      mail_sender,
    })
  }

  /// Configuration for tests and local tooling: in-memory database, fixed secret.
  pub fn for_tests() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8000,
      database_url: "sqlite::memory:".to_string(),
      database_max_connections: 1,
      app_base_url: "http://127.0.0.1:8000".to_string(),
      secret_key: "test-secret-key-0123456789abcdef".to_string(),
      reset_token_max_age: Duration::seconds(1800),
      remember_cookie_duration: Duration::days(365),
      cookie_secure: false,
      mail_sender: "noreply@biudzetas.lt".to_string(),
    }
  }
}
