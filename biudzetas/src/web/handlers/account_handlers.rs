// biudzetas/src/web/handlers/account_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::db;
use crate::errors::Result as AppResult;
use crate::services::entry_service;
use crate::state::AppState;
use crate::web::extractors::CurrentUser;
use crate::web::flash::FlashMessages;
use crate::web::views::Page;

#[instrument(name = "handler::account", skip_all, fields(user_id = user.id()))]
pub async fn account_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  flashes: FlashMessages,
) -> AppResult<HttpResponse> {
  let entry_count = entry_service::count_entries_for_user(&app_state.db_pool, user.id()).await?;
  Page::new("paskyra.html", "Paskyra")
    .with("user", &user.0)
    .with("entry_count", &entry_count)
    .render(&app_state, Some(&user.0), flashes)
}

// Liveness probe; also checks that the database answers.
pub async fn health_check_handler(app_state: web::Data<AppState>) -> AppResult<HttpResponse> {
  db::ping(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}
