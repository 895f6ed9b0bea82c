// biudzetas/src/services/auth_service.rs

//! Account storage and credential checks: password hashing, registration, login.

use crate::errors::AppError;
use crate::models::user::{User, DEFAULT_IMAGE_FILE};
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use sqlx::SqlitePool;
use tracing::{debug, error, event, info, instrument, warn, Level};

const USER_COLUMNS: &str = "id, name, email, image_file, password_hash";

/// Hashes a plain-text password with Argon2 and a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on mismatch. A stored hash that cannot be parsed is an internal
/// error, not an authentication failure.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[instrument(name = "auth_service::name_taken", skip(pool))]
pub async fn name_taken(pool: &SqlitePool, name: &str) -> Result<bool, AppError> {
  let matches = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE name = ?")
    .bind(name.trim())
    .fetch_one(pool)
    .await?;
  Ok(matches > 0)
}

#[instrument(name = "auth_service::email_taken", skip(pool))]
pub async fn email_taken(pool: &SqlitePool, email: &str) -> Result<bool, AppError> {
  let matches = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
    .bind(normalize_email(email))
    .fetch_one(pool)
    .await?;
  Ok(matches > 0)
}

/// Creates an account. A name or email that is already registered is rejected with
/// `AppError::Validation` and nothing is written.
#[instrument(name = "auth_service::register_user", skip(pool, new_user), fields(name = %new_user.name))]
pub async fn register_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, AppError> {
  let name = new_user.name.trim().to_string();
  let email = normalize_email(&new_user.email);

  if name_taken(pool, &name).await? {
    warn!("Attempt to register with an existing name.");
    return Err(AppError::Validation("Šis vardas jau naudojamas. Pasirinkite kitą.".to_string()));
  }
  if email_taken(pool, &email).await? {
    warn!("Attempt to register with an existing email.");
    return Err(AppError::Validation("Šis el. pašto adresas jau naudojamas.".to_string()));
  }

  let password_hash = hash_password(&new_user.password)?;

  let inserted = sqlx::query_as::<_, User>(&format!(
    "INSERT INTO users (name, email, image_file, password_hash) VALUES (?, ?, ?, ?) RETURNING {}",
    USER_COLUMNS
  ))
  .bind(&name)
  .bind(&email)
  .bind(DEFAULT_IMAGE_FILE)
  .bind(&password_hash)
  .fetch_one(pool)
  .await
  .map_err(AppError::from);

  match inserted {
    Ok(user) => {
      info!(user_id = user.id, "User registered.");
      Ok(user)
    }
    // Lost a race against a concurrent registration.
    Err(e) if e.is_unique_violation() => {
      warn!("Unique constraint hit while registering user.");
      Err(AppError::Validation("Šis vardas arba el. pašto adresas jau naudojamas.".to_string()))
    }
    Err(e) => Err(e),
  }
}

#[instrument(name = "auth_service::find_user_by_id", skip(pool))]
pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, AppError> {
  let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
  Ok(user)
}

#[instrument(name = "auth_service::find_user_by_email", skip(pool, email))]
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
  let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await?;
  Ok(user)
}

/// Looks the user up by email and checks the password. Unknown email and wrong password
/// both yield `Ok(None)`.
#[instrument(name = "auth_service::authenticate", skip(pool, email, password))]
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<Option<User>, AppError> {
  let Some(user) = find_user_by_email(pool, email).await? else {
    debug!("No account for the supplied email.");
    return Ok(None);
  };

  if verify_password(&user.password_hash, password)? {
    event!(Level::INFO, user_id = user.id, "Password verified.");
    Ok(Some(user))
  } else {
    warn!(user_id = user.id, "Password mismatch.");
    Ok(None)
  }
}

#[instrument(name = "auth_service::update_password", skip(pool, new_password))]
pub async fn update_password(pool: &SqlitePool, user_id: i64, new_password: &str) -> Result<(), AppError> {
  let password_hash = hash_password(new_password)?;
  let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
    .bind(&password_hash)
    .bind(user_id)
    .execute(pool)
    .await?;
  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("User {} not found.", user_id)));
  }
  info!("Password updated.");
  Ok(())
}
