// biudzetas/src/web/handlers/entry_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::forms::{EntryForm, FormErrors};
use crate::models::Entry;
use crate::services::entry_service;
use crate::state::AppState;
use crate::web::extractors::CurrentUser;
use crate::web::flash::{Flash, FlashCategory, FlashMessages};
use crate::web::views::{redirect, redirect_with_flash, Page};

/// Entry as shown in templates.
#[derive(Serialize)]
struct EntryView {
  id: i64,
  message: String,
  recorded_at: String,
}

impl From<&Entry> for EntryView {
  fn from(entry: &Entry) -> Self {
    Self {
      id: entry.id,
      message: entry.message.clone(),
      recorded_at: entry.recorded_at_display(),
    }
  }
}

fn entry_form_page(form: &EntryForm, errors: &FormErrors) -> Page {
  Page::new("index.html", "Naujas įrašas")
    .with("form", form)
    .with("errors", errors)
}

fn update_page(entry: &Entry, form: &EntryForm, errors: &FormErrors) -> Page {
  Page::new("irasas_update.html", "Redaguoti įrašą")
    .with("entry", &EntryView::from(entry))
    .with("form", form)
    .with("errors", errors)
}

fn entry_not_found(entry_id: i64) -> AppError {
  AppError::NotFound(format!("Įrašas {} nerastas.", entry_id))
}

#[instrument(name = "handler::new_entry_form", skip_all, fields(user_id = user.id()))]
pub async fn new_entry_form_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  flashes: FlashMessages,
) -> AppResult<HttpResponse> {
  entry_form_page(&EntryForm::default(), &FormErrors::default()).render(&app_state, Some(&user.0), flashes)
}

#[instrument(name = "handler::create_entry", skip_all, fields(user_id = user.id()))]
pub async fn create_entry_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  flashes: FlashMessages,
  form: web::Form<EntryForm>,
) -> AppResult<HttpResponse> {
  let form = form.into_inner();
  let errors = form.validate();
  if !errors.is_empty() {
    return entry_form_page(&form, &errors).render(&app_state, Some(&user.0), flashes);
  }

  let entry = entry_service::create_entry(&app_state.db_pool, user.id(), &form.message, Utc::now()).await?;
  info!(entry_id = entry.id, "Entry created via form.");
  Ok(redirect("/irasai"))
}

#[instrument(name = "handler::list_entries", skip_all, fields(user_id = user.id()))]
pub async fn list_entries_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  flashes: FlashMessages,
) -> AppResult<HttpResponse> {
  let entries = entry_service::list_entries_for_user(&app_state.db_pool, user.id()).await?;
  info!("Fetched {} entries.", entries.len());

  let views: Vec<EntryView> = entries.iter().map(EntryView::from).collect();
  Page::new("irasai.html", "Įrašai")
    .with("entries", &views)
    .render(&app_state, Some(&user.0), flashes)
}

#[instrument(name = "handler::delete_entry", skip_all, fields(user_id = user.id(), entry_id = %path.as_ref()))]
pub async fn delete_entry_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  flashes: FlashMessages,
  path: web::Path<i64>,
) -> AppResult<HttpResponse> {
  let entry_id = path.into_inner();
  entry_service::delete_entry(&app_state.db_pool, user.id(), entry_id).await?;
  Ok(redirect_with_flash(
    "/irasai",
    flashes,
    Flash::new(FlashCategory::Success, "Įrašas ištrintas."),
  ))
}

#[instrument(name = "handler::edit_entry_form", skip_all, fields(user_id = user.id(), entry_id = %path.as_ref()))]
pub async fn edit_entry_form_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  flashes: FlashMessages,
  path: web::Path<i64>,
) -> AppResult<HttpResponse> {
  let entry_id = path.into_inner();
  let Some(entry) = entry_service::find_owned_entry(&app_state.db_pool, user.id(), entry_id).await? else {
    warn!("Edit requested for missing or foreign entry.");
    return Err(entry_not_found(entry_id));
  };

  let form = EntryForm {
    message: entry.message.clone(),
  };
  update_page(&entry, &form, &FormErrors::default()).render(&app_state, Some(&user.0), flashes)
}

#[instrument(name = "handler::update_entry", skip_all, fields(user_id = user.id(), entry_id = %path.as_ref()))]
pub async fn update_entry_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  flashes: FlashMessages,
  path: web::Path<i64>,
  form: web::Form<EntryForm>,
) -> AppResult<HttpResponse> {
  let entry_id = path.into_inner();
  let form = form.into_inner();

  let errors = form.validate();
  if !errors.is_empty() {
    let Some(entry) = entry_service::find_owned_entry(&app_state.db_pool, user.id(), entry_id).await? else {
      return Err(entry_not_found(entry_id));
    };
    return update_page(&entry, &form, &errors).render(&app_state, Some(&user.0), flashes);
  }

  entry_service::update_entry(&app_state.db_pool, user.id(), entry_id, &form.message, Utc::now()).await?;
  Ok(redirect("/irasai"))
}
