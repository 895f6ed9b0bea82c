// biudzetas/src/web/views.rs

//! Template loading and the page/redirect responses shared by all handlers.

use actix_web::http::header;
use actix_web::HttpResponse;
use serde::Serialize;
use tera::{Context, Tera};

use crate::errors::Result as AppResult;
use crate::models::User;
use crate::state::AppState;
use crate::web::flash::{self, Flash, FlashMessages};

// Embedded so the binary and the tests do not depend on the working directory.
const TEMPLATES: &[(&str, &str)] = &[
  ("base.html", include_str!("../../templates/base.html")),
  ("index.html", include_str!("../../templates/index.html")),
  ("registruotis.html", include_str!("../../templates/registruotis.html")),
  ("prisijungti.html", include_str!("../../templates/prisijungti.html")),
  ("paskyra.html", include_str!("../../templates/paskyra.html")),
  ("irasai.html", include_str!("../../templates/irasai.html")),
  ("irasas_update.html", include_str!("../../templates/irasas_update.html")),
  ("reset_request.html", include_str!("../../templates/reset_request.html")),
  ("reset_token.html", include_str!("../../templates/reset_token.html")),
];

pub fn load_templates() -> tera::Result<Tera> {
  let mut tera = Tera::default();
  tera.add_raw_templates(TEMPLATES.iter().copied())?;
  Ok(tera)
}

#[derive(Serialize)]
struct NavUser<'a> {
  name: &'a str,
}

/// A page about to be rendered: template name plus context.
pub struct Page {
  template: &'static str,
  context: Context,
}

impl Page {
  pub fn new(template: &'static str, title: &str) -> Self {
    let mut context = Context::new();
    context.insert("title", title);
    Self { template, context }
  }

  pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
    self.context.insert(key, value);
    self
  }

  /// Renders with the navigation user and pending flashes; consumes the flash cookie.
  pub fn render(mut self, app_state: &AppState, user: Option<&User>, flashes: FlashMessages) -> AppResult<HttpResponse> {
    self.context.insert("current_user", &user.map(|u| NavUser { name: &u.name }));
    self.context.insert("flashes", &flashes.0);
    let html = app_state.templates.render(self.template, &self.context)?;

    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    if !flashes.is_empty() {
      response.cookie(flash::removal_cookie());
    }
    Ok(response.body(html))
  }
}

pub fn redirect(location: &str) -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, location.to_string()))
    .finish()
}

/// Redirects with `message` appended to the messages still waiting in `queued`.
pub fn redirect_with_flash(location: &str, queued: FlashMessages, message: Flash) -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, location.to_string()))
    .cookie(queued.push(message).into_cookie())
    .finish()
}

/// Only same-site absolute paths are honoured as post-login targets.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
  next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_templates_parse() {
    let tera = load_templates().unwrap();
    assert!(tera.get_template_names().any(|name| name == "irasai.html"));
  }

  #[test]
  fn next_must_be_local() {
    assert_eq!(safe_next(Some("/irasai")), Some("/irasai"));
    assert_eq!(safe_next(Some("//evil.example")), None);
    assert_eq!(safe_next(Some("https://evil.example")), None);
    assert_eq!(safe_next(Some("/\\evil.example")), None);
    assert_eq!(safe_next(None), None);
  }
}
