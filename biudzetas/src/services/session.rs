// biudzetas/src/services/session.rs

//! Session cookie issuance and verification.

use actix_web::cookie::{time, Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jwt::Claims;
use tracing::{debug, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::services::signing::{self, Signer};

pub const SESSION_COOKIE: &str = "biudzetas_session";
const SESSION_AUDIENCE: &str = "session";
const REMEMBER_CLAIM: &str = "remember";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
  pub user_id: i64,
  /// Unix seconds.
  pub issued_at: i64,
  pub remember: bool,
}

impl SessionClaims {
  pub fn new(user_id: i64, remember: bool, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      issued_at: now.timestamp(),
      remember,
    }
  }

  /// Remembered sessions expire after `remember_duration`; the others carry no `exp`
  /// and end with the browser session.
  fn to_claims(&self, remember_duration: Duration) -> Option<Claims> {
    let issued_at = signing::from_timestamp(u64::try_from(self.issued_at).ok()?)?;
    let lifetime = self.remember.then_some(remember_duration);
    let mut claims = Claims::new(signing::registered_claims(
      SESSION_AUDIENCE,
      self.user_id.to_string(),
      issued_at,
      lifetime,
    ));
    claims.private.insert(REMEMBER_CLAIM.to_string(), self.remember.into());
    Some(claims)
  }

  fn from_claims(claims: &Claims) -> Option<Self> {
    Some(Self {
      user_id: claims.registered.subject.as_ref()?.parse().ok()?,
      issued_at: i64::try_from(claims.registered.issued_at?).ok()?,
      remember: claims
        .private
        .get(REMEMBER_CLAIM)
        .and_then(|value| value.as_bool())
        .unwrap_or(false),
    })
  }
}

#[instrument(name = "session::issue_cookie", skip(signer), fields(user_id = claims.user_id))]
pub fn issue_cookie(
  signer: &Signer,
  claims: &SessionClaims,
  remember_duration: Duration,
  secure: bool,
) -> AppResult<Cookie<'static>> {
  let jwt_claims = claims
    .to_claims(remember_duration)
    .ok_or_else(|| AppError::Internal("Session issue time is out of range".to_string()))?;
  let value = signer
    .sign(jwt_claims)
    .map_err(|e| AppError::Internal(format!("Failed to encode session: {}", e)))?;

  let mut builder = Cookie::build(SESSION_COOKIE, value)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(secure);
  if claims.remember {
    // Without remember the cookie lasts for the browser session.
    builder = builder.max_age(time::Duration::seconds(remember_duration.num_seconds()));
  }

  debug!(remember = claims.remember, "Session cookie issued.");
  Ok(builder.finish())
}

/// Decodes a session cookie value. Returns `None` for anything forged, malformed or
/// past its expiry.
pub fn read_claims(signer: &Signer, cookie_value: &str, now: DateTime<Utc>) -> Option<SessionClaims> {
  match signer.verify(SESSION_AUDIENCE, cookie_value, now) {
    Ok(claims) => SessionClaims::from_claims(&claims),
    Err(e) => {
      debug!(error = %e, "Rejected session cookie.");
      None
    }
  }
}

pub fn removal_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::new(SESSION_COOKIE, "");
  cookie.set_path("/");
  cookie.make_removal();
  cookie
}
