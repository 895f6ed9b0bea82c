// biudzetas/src/services/email_mock.rs

//! Stand-in mailer: outbound messages are written to the log instead of an SMTP server.

use crate::errors::Result as AppResult;
use rand_core::{OsRng, RngCore};
use tracing::info;

#[derive(Debug)]
pub struct SentEmailInfo {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub body: String,
  pub message_id: String,
}

pub async fn send_mock_email(to: &str, from: &str, subject: &str, body: &str) -> AppResult<SentEmailInfo> {
  let message_id = format!("mock_email_{:016x}", OsRng.next_u64());
  info!(
    %message_id,
    "Simulating sending email: To='{}', From='{}', Subject='{}'",
    to, from, subject
  );

  Ok(SentEmailInfo {
    to: to.to_string(),
    from: from.to_string(),
    subject: subject.to_string(),
    body: body.to_string(),
    message_id,
  })
}

/// Sends the password reset link for `reset_url`.
pub async fn send_reset_email(to: &str, from: &str, reset_url: &str) -> AppResult<SentEmailInfo> {
  let body = format!(
    "Norėdami atkurti slaptažodį, paspauskite nuorodą:\n{}\n\n\
     Jei slaptažodžio atkūrimo neprašėte, šio laiško nepaisykite.",
    reset_url
  );
  send_mock_email(to, from, "Slaptažodžio atkūrimas", &body).await
}
