// biudzetas/src/web/handlers/reset_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::errors::Result as AppResult;
use crate::forms::{FormErrors, PasswordResetForm, ResetRequestForm};
use crate::services::reset_token::{self, ResetTokenStatus};
use crate::services::{auth_service, email_mock};
use crate::state::AppState;
use crate::web::extractors::CurrentUser;
use crate::web::flash::{Flash, FlashCategory, FlashMessages};
use crate::web::views::{redirect, redirect_with_flash, Page};

// Same answer whether or not the email is registered.
const RESET_REQUESTED: &str = "Jei paskyra su šiuo el. paštu egzistuoja, išsiuntėme slaptažodžio atkūrimo nuorodą.";

fn request_page(form: &ResetRequestForm, errors: &FormErrors) -> Page {
  Page::new("reset_request.html", "Slaptažodžio atkūrimas")
    .with("form", form)
    .with("errors", errors)
}

fn new_password_page(token: &str, errors: &FormErrors) -> Page {
  Page::new("reset_token.html", "Naujas slaptažodis")
    .with("token", token)
    .with("errors", errors)
}

/// Redirect for tokens that cannot be used, telling expired links apart from bad ones.
fn unusable_token_redirect(status: &ResetTokenStatus, flashes: FlashMessages) -> HttpResponse {
  let message = match status {
    ResetTokenStatus::Expired => "Nuorodos galiojimas pasibaigė. Paprašykite naujos.",
    _ => "Nuoroda netinkama.",
  };
  redirect_with_flash("/reset_password", flashes, Flash::new(FlashCategory::Warning, message))
}

async fn check_token(app_state: &AppState, token: &str) -> AppResult<ResetTokenStatus> {
  reset_token::verify_reset_token(
    &app_state.db_pool,
    &app_state.signer,
    token,
    app_state.config.reset_token_max_age,
    Utc::now(),
  )
  .await
}

#[instrument(name = "handler::reset_request_form", skip_all)]
pub async fn reset_request_form_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  request_page(&ResetRequestForm::default(), &FormErrors::default()).render(&app_state, None, flashes)
}

#[instrument(name = "handler::reset_request", skip_all)]
pub async fn reset_request_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
  form: web::Form<ResetRequestForm>,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  let form = form.into_inner();
  let errors = form.validate();
  if !errors.is_empty() {
    return request_page(&form, &errors).render(&app_state, None, flashes);
  }

  match auth_service::find_user_by_email(&app_state.db_pool, &form.email).await? {
    Some(account) => {
      let token = reset_token::issue_reset_token(
        &app_state.signer,
        &account,
        app_state.config.reset_token_max_age,
        Utc::now(),
      )?;
      let reset_url = format!(
        "{}/reset_password/{}",
        app_state.config.app_base_url.trim_end_matches('/'),
        token
      );
      let sent = email_mock::send_reset_email(&account.email, &app_state.config.mail_sender, &reset_url).await?;
      info!(user_id = account.id, message_id = %sent.message_id, "Reset email sent.");
    }
    None => info!("Reset requested for an unknown email."),
  }

  Ok(redirect_with_flash(
    "/prisijungti",
    flashes,
    Flash::new(FlashCategory::Info, RESET_REQUESTED),
  ))
}

#[instrument(name = "handler::reset_token_form", skip_all)]
pub async fn reset_token_form_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
  path: web::Path<String>,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  let token = path.into_inner();
  match check_token(&app_state, &token).await? {
    ResetTokenStatus::Valid(_) => new_password_page(&token, &FormErrors::default()).render(&app_state, None, flashes),
    unusable => Ok(unusable_token_redirect(&unusable, flashes)),
  }
}

#[instrument(name = "handler::reset_password", skip_all)]
pub async fn reset_password_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
  path: web::Path<String>,
  form: web::Form<PasswordResetForm>,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  let token = path.into_inner();
  let account = match check_token(&app_state, &token).await? {
    ResetTokenStatus::Valid(account) => account,
    unusable => {
      warn!("Password reset attempted with an unusable token.");
      return Ok(unusable_token_redirect(&unusable, flashes));
    }
  };

  let errors = form.validate();
  if !errors.is_empty() {
    return new_password_page(&token, &errors).render(&app_state, None, flashes);
  }

  auth_service::update_password(&app_state.db_pool, account.id, &form.password).await?;
  info!(user_id = account.id, "Password reset completed.");
  Ok(redirect_with_flash(
    "/prisijungti",
    flashes,
    Flash::new(FlashCategory::Success, "Slaptažodis pakeistas! Galite prisijungti"),
  ))
}
