// biudzetas/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::web::flash::{Flash, FlashCategory, FlashMessages};

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  // Raised by the `CurrentUser` extractor; rendered as a redirect to the login page.
  // `queued` holds the flashes the request arrived with so the redirect keeps them.
  #[error("Login required to access {next}")]
  LoginRequired { next: String, queued: FlashMessages },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Template Error: {0}")]
  Template(#[from] tera::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// True when the underlying database error is a UNIQUE constraint violation.
  pub fn is_unique_violation(&self) -> bool {
    match self {
      AppError::Sqlx(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
      _ => false,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::LoginRequired { .. } => StatusCode::SEE_OTHER,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Template(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    if let AppError::LoginRequired { next, queued } = self {
      tracing::debug!(%next, "Redirecting anonymous request to login page");
      let flash = Flash::new(FlashCategory::Info, "Prisijunkite, kad galėtumėte matyti šį puslapį.");
      return HttpResponse::SeeOther()
        .insert_header((header::LOCATION, login_location(next)))
        .cookie(queued.clone().push(flash).into_cookie())
        .finish();
    }

    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");

    let (title, detail) = match self {
      AppError::Validation(m) => ("Neteisingi duomenys", m.as_str()),
      AppError::NotFound(m) => ("Nerasta", m.as_str()),
      // Internal details stay in the log.
      _ => ("Serverio klaida", "Įvyko vidinė klaida. Bandykite vėliau."),
    };

    HttpResponse::build(self.status_code())
      .content_type("text/html; charset=utf-8")
      .body(format!(
        "<!DOCTYPE html><html lang=\"lt\"><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{detail}</p><p><a href=\"/\">Į pradžią</a></p></body></html>",
        title = tera::escape_html(title),
        detail = tera::escape_html(detail),
      ))
  }
}

fn login_location(next: &str) -> String {
  format!("/prisijungti?next={}", urlencoding::encode(next))
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::MessageBody;

  fn login_required(next: &str) -> AppError {
    AppError::LoginRequired {
      next: next.to_string(),
      queued: FlashMessages::default(),
    }
  }

  #[test]
  fn login_required_redirects_with_next() {
    let resp = login_required("/irasai").error_response();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
      resp.headers().get(header::LOCATION).unwrap(),
      "/prisijungti?next=%2Firasai"
    );
  }

  #[test]
  fn next_is_percent_encoded() {
    let resp = login_required("/a&b#c").error_response();
    assert_eq!(
      resp.headers().get(header::LOCATION).unwrap(),
      "/prisijungti?next=%2Fa%26b%23c"
    );
  }

  #[test]
  fn login_redirect_keeps_queued_flashes() {
    let error = AppError::LoginRequired {
      next: "/".to_string(),
      queued: FlashMessages::default().push(Flash::new(FlashCategory::Success, "Sveiki")),
    };
    let resp = error.error_response();
    let cookie = resp
      .cookies()
      .find(|c| c.name() == crate::web::flash::FLASH_COOKIE)
      .unwrap()
      .into_owned();
    let req = actix_web::test::TestRequest::default().cookie(cookie).to_http_request();
    let categories: Vec<FlashCategory> = FlashMessages::from_cookies(&req).0.iter().map(|f| f.category).collect();
    assert_eq!(categories, vec![FlashCategory::Success, FlashCategory::Info]);
  }

  #[test]
  fn internal_errors_hide_details() {
    let resp = AppError::Internal("secret stack trace".to_string()).error_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = resp.into_body().try_into_bytes().unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(!body.contains("secret stack trace"));
  }

  #[test]
  fn not_found_message_is_escaped() {
    let resp = AppError::NotFound("<script>".to_string()).error_response();
    let body = resp.into_body().try_into_bytes().unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("&lt;script&gt;"));
  }
}
