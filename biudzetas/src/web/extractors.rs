// biudzetas/src/web/extractors.rs

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::errors::AppError;
use crate::models::User;
use crate::services::{auth_service, session};
use crate::state::AppState;
use crate::web::flash::FlashMessages;

/// The logged-in user, resolved from the session cookie.
///
/// Extraction fails with `AppError::LoginRequired` when there is no valid session, which
/// renders as a redirect to the login page. Use `Option<CurrentUser>` on pages open to
/// anonymous visitors.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
  pub fn id(&self) -> i64 {
    self.0.id
  }
}

impl FromRequest for CurrentUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let next = req.uri().path().to_string();
    let app_state = req.app_data::<web::Data<AppState>>().cloned();
    let cookie = req.cookie(session::SESSION_COOKIE);
    let queued = FlashMessages::from_cookies(req);

    Box::pin(async move {
      let login_required = || AppError::LoginRequired {
        next: next.clone(),
        queued: queued.clone(),
      };
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("AppState is not registered with the app.".to_string()))?;
      let cookie = cookie.ok_or_else(login_required)?;

      let claims = session::read_claims(&app_state.signer, cookie.value(), Utc::now()).ok_or_else(login_required)?;

      match auth_service::find_user_by_id(&app_state.db_pool, claims.user_id).await? {
        Some(user) => Ok(CurrentUser(user)),
        None => {
          debug!(user_id = claims.user_id, "Session refers to a missing user.");
          Err(login_required())
        }
      }
    })
  }
}
