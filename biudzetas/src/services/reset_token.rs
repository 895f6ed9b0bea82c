// biudzetas/src/services/reset_token.rs

//! Time-limited password reset tokens.
//!
//! A token is a JWT whose subject is the user id, with `iat` and `exp` set at issue
//! time. Verification reports *why* a token is unusable instead of collapsing every
//! failure into "no user".

use chrono::{DateTime, Duration, Utc};
use jwt::Claims;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::models::User;
use crate::services::auth_service;
use crate::services::signing::{self, SignatureError, Signer};

const RESET_AUDIENCE: &str = "password-reset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
  pub user_id: i64,
  /// Unix seconds.
  pub issued_at: i64,
}

/// Outcome of decoding a token, before the user is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
  Fresh(ResetToken),
  Expired(ResetToken),
  Invalid,
}

#[derive(Debug, Clone)]
pub enum ResetTokenStatus {
  Valid(User),
  Expired,
  Invalid,
}

impl ResetToken {
  pub fn new(user_id: i64, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      issued_at: now.timestamp(),
    }
  }

  pub fn issued_at(&self) -> Option<DateTime<Utc>> {
    signing::from_timestamp(u64::try_from(self.issued_at).ok()?)
  }

  fn from_claims(claims: &Claims) -> Option<Self> {
    Some(Self {
      user_id: claims.registered.subject.as_ref()?.parse().ok()?,
      issued_at: i64::try_from(claims.registered.issued_at?).ok()?,
    })
  }

  /// Signs the token; it expires `lifetime` after its issue time.
  pub fn encode(&self, signer: &Signer, lifetime: Duration) -> AppResult<String> {
    let issued_at = self
      .issued_at()
      .ok_or_else(|| AppError::Internal("Reset token issue time is out of range".to_string()))?;
    let claims = Claims::new(signing::registered_claims(
      RESET_AUDIENCE,
      self.user_id.to_string(),
      issued_at,
      Some(lifetime),
    ));
    signer
      .sign(claims)
      .map_err(|e| AppError::Internal(format!("Failed to encode reset token: {}", e)))
  }

  /// Checks signature and age. Pure; no database access.
  ///
  /// A token is expired once its own `exp` has passed or once it is older than
  /// `max_age`, whichever comes first.
  pub fn check(signer: &Signer, token: &str, max_age: Duration, now: DateTime<Utc>) -> TokenCheck {
    let claims = match signer.verify(RESET_AUDIENCE, token, now) {
      Ok(claims) => claims,
      Err(SignatureError::Expired(claims)) => {
        return Self::from_claims(&claims).map_or(TokenCheck::Invalid, TokenCheck::Expired);
      }
      Err(e) => {
        debug!(error = %e, "Reset token failed verification.");
        return TokenCheck::Invalid;
      }
    };

    let Some(decoded) = Self::from_claims(&claims) else {
      warn!("Reset token has no usable subject.");
      return TokenCheck::Invalid;
    };
    match decoded.issued_at() {
      Some(issued_at) if now - issued_at > max_age => TokenCheck::Expired(decoded),
      Some(_) => TokenCheck::Fresh(decoded),
      None => TokenCheck::Invalid,
    }
  }
}

#[instrument(name = "reset_token::issue", skip(signer, user), fields(user_id = user.id))]
pub fn issue_reset_token(signer: &Signer, user: &User, lifetime: Duration, now: DateTime<Utc>) -> AppResult<String> {
  let token = ResetToken::new(user.id, now).encode(signer, lifetime)?;
  info!("Password reset token issued.");
  Ok(token)
}

/// Resolves a reset token to its user. Expired tokens are reported even when the user
/// has since been deleted; unknown users on fresh tokens are `Invalid`.
#[instrument(name = "reset_token::verify", skip(pool, signer, token))]
pub async fn verify_reset_token(
  pool: &SqlitePool,
  signer: &Signer,
  token: &str,
  max_age: Duration,
  now: DateTime<Utc>,
) -> AppResult<ResetTokenStatus> {
  match ResetToken::check(signer, token, max_age, now) {
    TokenCheck::Invalid => Ok(ResetTokenStatus::Invalid),
    TokenCheck::Expired(decoded) => {
      info!(user_id = decoded.user_id, "Expired reset token presented.");
      Ok(ResetTokenStatus::Expired)
    }
    TokenCheck::Fresh(decoded) => match auth_service::find_user_by_id(pool, decoded.user_id).await? {
      Some(user) => Ok(ResetTokenStatus::Valid(user)),
      None => {
        warn!(user_id = decoded.user_id, "Reset token refers to a missing user.");
        Ok(ResetTokenStatus::Invalid)
      }
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn signer() -> Signer {
    Signer::new(b"0123456789abcdef").unwrap()
  }

  fn max_age() -> Duration {
    Duration::seconds(1800)
  }

  #[test]
  fn fresh_token_is_accepted() {
    let now = Utc::now();
    let token = ResetToken::new(5, now).encode(&signer(), max_age()).unwrap();
    assert_eq!(
      ResetToken::check(&signer(), &token, max_age(), now + Duration::seconds(60)),
      TokenCheck::Fresh(ResetToken::new(5, now))
    );
  }

  #[test]
  fn old_token_is_expired_not_invalid() {
    let issued = Utc::now() - Duration::seconds(1801);
    let token = ResetToken::new(5, issued).encode(&signer(), max_age()).unwrap();
    assert!(matches!(
      ResetToken::check(&signer(), &token, max_age(), Utc::now()),
      TokenCheck::Expired(ResetToken { user_id: 5, .. })
    ));
  }

  #[test]
  fn shorter_max_age_expires_a_long_lived_token() {
    let issued = Utc::now() - Duration::seconds(120);
    let token = ResetToken::new(5, issued).encode(&signer(), Duration::hours(1)).unwrap();
    assert!(matches!(
      ResetToken::check(&signer(), &token, Duration::seconds(60), Utc::now()),
      TokenCheck::Expired(_)
    ));
  }

  #[test]
  fn future_token_is_invalid() {
    let issued = Utc::now() + Duration::hours(1);
    let token = ResetToken::new(5, issued).encode(&signer(), max_age()).unwrap();
    assert_eq!(
      ResetToken::check(&signer(), &token, max_age(), Utc::now()),
      TokenCheck::Invalid
    );
  }

  #[test]
  fn tampered_token_is_invalid() {
    let token = ResetToken::new(5, Utc::now()).encode(&signer(), max_age()).unwrap();
    let tampered = format!("x{}", token);
    assert_eq!(
      ResetToken::check(&signer(), &tampered, max_age(), Utc::now()),
      TokenCheck::Invalid
    );
  }

  #[test]
  fn session_cookie_is_not_a_reset_token() {
    let claims = crate::services::session::SessionClaims::new(5, false, Utc::now());
    let cookie = crate::services::session::issue_cookie(&signer(), &claims, Duration::days(1), false).unwrap();
    assert_eq!(
      ResetToken::check(&signer(), cookie.value(), max_age(), Utc::now()),
      TokenCheck::Invalid
    );
  }
}
