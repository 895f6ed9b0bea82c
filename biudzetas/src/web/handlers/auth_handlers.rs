// biudzetas/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::forms::{FormErrors, LoginForm, RegistrationForm};
use crate::services::auth_service::{self, NewUser};
use crate::services::session::{self, SessionClaims};
use crate::state::AppState;
use crate::web::extractors::CurrentUser;
use crate::web::flash::{Flash, FlashCategory, FlashMessages};
use crate::web::views::{redirect, redirect_with_flash, safe_next, Page};

const LOGIN_FAILED: &str = "Prisijungti nepavyko. Patikrinkite el. paštą ir slaptažodį";

#[derive(Deserialize, Debug)]
pub struct LoginQuery {
  pub next: Option<String>,
}

fn registration_page(form: &RegistrationForm, errors: &FormErrors, form_error: Option<&str>) -> Page {
  Page::new("registruotis.html", "Registruotis")
    .with("form", form)
    .with("errors", errors)
    .with("form_error", &form_error)
}

fn login_page(form: &LoginForm, errors: &FormErrors, next: Option<&str>) -> Page {
  Page::new("prisijungti.html", "Prisijungti")
    .with("form", form)
    .with("errors", errors)
    .with("next", &next)
}

#[instrument(name = "handler::register_form", skip_all)]
pub async fn register_form_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  registration_page(&RegistrationForm::default(), &FormErrors::default(), None).render(&app_state, None, flashes)
}

#[instrument(name = "handler::register", skip_all, fields(name = %form.name))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
  form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  let form = form.into_inner();

  let mut errors = form.validate();
  if errors.field("vardas").is_empty() && auth_service::name_taken(&app_state.db_pool, &form.name).await? {
    errors.add("vardas", "Šis vardas jau naudojamas. Pasirinkite kitą.");
  }
  if errors.field("el_pastas").is_empty() && auth_service::email_taken(&app_state.db_pool, &form.email).await? {
    errors.add("el_pastas", "Šis el. pašto adresas jau naudojamas.");
  }
  if !errors.is_empty() {
    info!("Registration form rejected.");
    return registration_page(&form, &errors, None).render(&app_state, None, flashes);
  }

  let new_user = NewUser {
    name: form.name.clone(),
    email: form.email.clone(),
    password: form.password.clone(),
  };
  match auth_service::register_user(&app_state.db_pool, new_user).await {
    Ok(created) => {
      info!(user_id = created.id, "Registration successful.");
      Ok(redirect_with_flash(
        "/",
        flashes,
        Flash::new(FlashCategory::Success, "Sėkmingai prisiregistravote! Galite prisijungti"),
      ))
    }
    Err(AppError::Validation(message)) => {
      warn!(%message, "Registration rejected by the database.");
      registration_page(&form, &errors, Some(&message)).render(&app_state, None, flashes)
    }
    Err(other) => Err(other),
  }
}

#[instrument(name = "handler::login_form", skip_all)]
pub async fn login_form_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
  query: web::Query<LoginQuery>,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  let next = safe_next(query.next.as_deref());
  login_page(&LoginForm::default(), &FormErrors::default(), next).render(&app_state, None, flashes)
}

#[instrument(name = "handler::login", skip_all, fields(req_email = %form.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  user: Option<CurrentUser>,
  flashes: FlashMessages,
  query: web::Query<LoginQuery>,
  form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
  if user.is_some() {
    return Ok(redirect("/"));
  }
  let form = form.into_inner();
  let next = safe_next(query.next.as_deref());

  let errors = form.validate();
  if !errors.is_empty() {
    return login_page(&form, &errors, next).render(&app_state, None, flashes);
  }

  let Some(user) = auth_service::authenticate(&app_state.db_pool, &form.email, &form.password).await? else {
    warn!("Login failed.");
    let mut flashes = flashes;
    flashes.0.push(Flash::new(FlashCategory::Danger, LOGIN_FAILED));
    return login_page(&form, &errors, next).render(&app_state, None, flashes);
  };

  let claims = SessionClaims::new(user.id, form.remember(), Utc::now());
  let cookie = session::issue_cookie(
    &app_state.signer,
    &claims,
    app_state.config.remember_cookie_duration,
    app_state.config.cookie_secure,
  )?;
  info!(user_id = user.id, remember = claims.remember, "Login successful.");

  let mut response = redirect(next.unwrap_or("/"));
  response
    .add_cookie(&cookie)
    .map_err(|e| AppError::Internal(format!("Failed to set session cookie: {}", e)))?;
  Ok(response)
}

#[instrument(name = "handler::logout", skip_all)]
pub async fn logout_handler() -> HttpResponse {
  info!("Logging out.");
  HttpResponse::SeeOther()
    .insert_header((actix_web::http::header::LOCATION, "/"))
    .cookie(session::removal_cookie())
    .finish()
}
