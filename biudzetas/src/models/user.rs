// biudzetas/src/models/user.rs

use serde::Serialize;
use sqlx::FromRow;

/// Image shown for accounts that never uploaded one.
pub const DEFAULT_IMAGE_FILE: &str = "default.jpg";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub name: String,
  pub email: String,
  pub image_file: String,
  #[serde(skip_serializing)] // Never hand the hash to a template
  pub password_hash: String,
}
