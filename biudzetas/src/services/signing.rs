// biudzetas/src/services/signing.rs

//! HS256 JSON Web Tokens for session cookies and password reset links.
//!
//! Every token names its purpose in the `aud` claim. A session cookie is therefore never
//! accepted where a reset token is expected, and the reverse also holds.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, RegisteredClaims, SignWithKey, VerifyWithKey};
use sha2::Sha256;
use thiserror::Error;

// Tolerated clock drift for tokens that claim to be issued slightly in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 30;

#[derive(Debug, Error)]
pub enum SignatureError {
  #[error("signing key rejected")]
  InvalidKey,
  #[error("token could not be verified: {0}")]
  Jwt(#[from] jwt::Error),
  #[error("token was issued for {found:?}, expected {expected}")]
  WrongAudience { expected: String, found: Option<String> },
  #[error("token has no valid issue time")]
  MissingIssuedAt,
  #[error("token is issued in the future")]
  IssuedInFuture,
  /// The signature is valid but the `exp` claim has passed. The claims are kept so the
  /// caller can still say whose token it was.
  #[error("token expired")]
  Expired(Box<Claims>),
}

pub fn to_timestamp(at: DateTime<Utc>) -> u64 {
  at.timestamp().max(0) as u64
}

pub fn from_timestamp(secs: u64) -> Option<DateTime<Utc>> {
  Utc.timestamp_opt(i64::try_from(secs).ok()?, 0).single()
}

/// Registered claims for a token of `audience` about `subject`, issued at `issued_at`.
pub fn registered_claims(
  audience: &str,
  subject: String,
  issued_at: DateTime<Utc>,
  lifetime: Option<Duration>,
) -> RegisteredClaims {
  RegisteredClaims {
    subject: Some(subject),
    audience: Some(audience.to_string()),
    issued_at: Some(to_timestamp(issued_at)),
    expiration: lifetime.map(|lifetime| to_timestamp(issued_at + lifetime)),
    ..Default::default()
  }
}

#[derive(Clone)]
pub struct Signer {
  key: Hmac<Sha256>,
}

impl std::fmt::Debug for Signer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Signer").field("key", &"[REDACTED]").finish()
  }
}

impl Signer {
  pub fn new(secret: &[u8]) -> Result<Self, SignatureError> {
    Ok(Self {
      key: Hmac::new_from_slice(secret).map_err(|_| SignatureError::InvalidKey)?,
    })
  }

  pub fn sign(&self, claims: Claims) -> Result<String, SignatureError> {
    Ok(claims.sign_with_key(&self.key)?)
  }

  /// Verifies signature, audience, issue time and expiry, in that order.
  pub fn verify(&self, audience: &str, token: &str, now: DateTime<Utc>) -> Result<Claims, SignatureError> {
    let claims: Claims = token.verify_with_key(&self.key)?;

    if claims.registered.audience.as_deref() != Some(audience) {
      return Err(SignatureError::WrongAudience {
        expected: audience.to_string(),
        found: claims.registered.audience.clone(),
      });
    }

    let issued_at = claims
      .registered
      .issued_at
      .and_then(from_timestamp)
      .ok_or(SignatureError::MissingIssuedAt)?;
    if issued_at - now > Duration::seconds(MAX_CLOCK_SKEW_SECS) {
      return Err(SignatureError::IssuedInFuture);
    }

    let expiration = claims.registered.expiration.and_then(from_timestamp);
    if let Some(expiration) = expiration {
      if expiration <= now {
        return Err(SignatureError::Expired(Box::new(claims)));
      }
    }

    Ok(claims)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn signer() -> Signer {
    Signer::new(b"0123456789abcdef").unwrap()
  }

  fn token(audience: &str, issued_at: DateTime<Utc>, lifetime: Option<Duration>) -> String {
    let claims = Claims::new(registered_claims(audience, "7".to_string(), issued_at, lifetime));
    signer().sign(claims).unwrap()
  }

  #[test]
  fn verifies_own_signature() {
    let now = Utc::now();
    let claims = signer().verify("session", &token("session", now, None), now).unwrap();
    assert_eq!(claims.registered.subject.as_deref(), Some("7"));
    assert_eq!(claims.registered.issued_at, Some(to_timestamp(now)));
  }

  #[test]
  fn rejects_other_audience() {
    let now = Utc::now();
    let result = signer().verify("password-reset", &token("session", now, None), now);
    assert!(matches!(result, Err(SignatureError::WrongAudience { .. })));
  }

  #[test]
  fn rejects_other_key() {
    let now = Utc::now();
    let other = Signer::new(b"fedcba9876543210").unwrap();
    let result = other.verify("session", &token("session", now, None), now);
    assert!(matches!(result, Err(SignatureError::Jwt(_))));
  }

  #[test]
  fn rejects_tampered_claims() {
    let now = Utc::now();
    let genuine = token("session", now, None);
    let forged_claims = Claims::new(registered_claims("session", "1".to_string(), now, None));
    let forged_body = Signer::new(b"attacker-chosen-key").unwrap().sign(forged_claims).unwrap();

    // Genuine header and signature around someone else's claims.
    let genuine_parts: Vec<&str> = genuine.split('.').collect();
    let forged_parts: Vec<&str> = forged_body.split('.').collect();
    let spliced = format!("{}.{}.{}", genuine_parts[0], forged_parts[1], genuine_parts[2]);
    assert!(matches!(signer().verify("session", &spliced, now), Err(SignatureError::Jwt(_))));
  }

  #[test]
  fn past_expiration_keeps_claims() {
    let issued = Utc::now() - Duration::hours(2);
    let result = signer().verify("session", &token("session", issued, Some(Duration::hours(1))), Utc::now());
    match result {
      Err(SignatureError::Expired(claims)) => assert_eq!(claims.registered.subject.as_deref(), Some("7")),
      other => panic!("Expected an expired token, got {:?}", other),
    }
  }

  #[test]
  fn small_clock_skew_is_tolerated() {
    let now = Utc::now();
    assert!(signer().verify("session", &token("session", now + Duration::seconds(10), None), now).is_ok());
    assert!(matches!(
      signer().verify("session", &token("session", now + Duration::hours(1), None), now),
      Err(SignatureError::IssuedInFuture)
    ));
  }

  #[test]
  fn rejects_garbage() {
    let now = Utc::now();
    assert!(matches!(signer().verify("session", "no-dots-here", now), Err(SignatureError::Jwt(_))));
    assert!(matches!(signer().verify("session", "a.b.c", now), Err(SignatureError::Jwt(_))));
  }
}
