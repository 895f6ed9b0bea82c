// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset of these helpers

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::TestRequest;
use biudzetas::services::session::{self, SessionClaims};
use biudzetas::web::flash::{Flash, FlashMessages, FLASH_COOKIE};
use biudzetas::{build_state, AppConfig, AppState};
use chrono::Utc;
use once_cell::sync::Lazy;
use std::sync::Arc;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Fresh application state over a private in-memory database.
pub async fn test_state() -> AppState {
  setup_tracing();
  build_state(Arc::new(AppConfig::for_tests()))
    .await
    .expect("test state should build")
}

// Not a valid Argon2 hash: rows created this way cannot log in with a password.
const PLACEHOLDER_HASH: &str = "not-a-real-hash";

/// Inserts a user row directly, skipping password hashing.
pub async fn insert_user(state: &AppState, name: &str, email: &str) -> i64 {
  sqlx::query_scalar::<_, i64>("INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?) RETURNING id")
    .bind(name)
    .bind(email)
    .bind(PLACEHOLDER_HASH)
    .fetch_one(&state.db_pool)
    .await
    .expect("user insert should succeed")
}

pub async fn count_rows(state: &AppState, table: &str) -> i64 {
  sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
    .fetch_one(&state.db_pool)
    .await
    .expect("count should succeed")
}

/// A session cookie for `user_id`, as issued by a successful login.
pub fn session_cookie_for(state: &AppState, user_id: i64) -> Cookie<'static> {
  let claims = SessionClaims::new(user_id, false, Utc::now());
  session::issue_cookie(&state.signer, &claims, state.config.remember_cookie_duration, false)
    .expect("session cookie should encode")
}

pub fn cookie_from<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
  resp.response().cookies().find(|c| c.name() == name).map(|c| c.into_owned())
}

/// Flash messages queued by `resp`, oldest first.
pub fn flashes_from<B>(resp: &ServiceResponse<B>) -> Vec<Flash> {
  cookie_from(resp, FLASH_COOKIE)
    .map(|cookie| FlashMessages::from_cookies(&TestRequest::default().cookie(cookie).to_http_request()).0)
    .unwrap_or_default()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
  resp
    .headers()
    .get(header::LOCATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_string()
}

pub fn login_request(email: &str, password: &str) -> TestRequest {
  TestRequest::post()
    .uri("/prisijungti")
    .set_form([("el_pastas", email), ("slaptazodis", password)])
}
