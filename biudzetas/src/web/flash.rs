// biudzetas/src/web/flash.rs

//! One-shot messages carried to the next rendered page in a cookie.
//!
//! Messages queue up across redirects: a response that redirects instead of rendering
//! writes the incoming queue back with its own message appended. Only a rendered page
//! clears the cookie.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "biudzetas_flash";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
  Success,
  Info,
  Warning,
  Danger,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
  pub category: FlashCategory,
  pub message: String,
}

impl Flash {
  pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
    Self {
      category,
      message: message.into(),
    }
  }
}

/// Messages waiting in the request's flash cookie. Malformed cookies read as empty.
#[derive(Debug, Default, Clone)]
pub struct FlashMessages(pub Vec<Flash>);

impl FlashMessages {
  fn parse(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
      .decode(value)
      .ok()
      .and_then(|json| serde_json::from_slice(&json).ok())
      .unwrap_or_default()
  }

  /// The queue carried by the request's flash cookie.
  pub fn from_cookies(req: &HttpRequest) -> Self {
    let messages = req
      .cookie(FLASH_COOKIE)
      .map(|cookie| Self::parse(cookie.value()))
      .unwrap_or_default();
    FlashMessages(messages)
  }

  pub fn push(mut self, flash: Flash) -> Self {
    self.0.push(flash);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn into_cookie(self) -> Cookie<'static> {
    // Serializing plain structs to JSON cannot fail.
    let json = serde_json::to_vec(&self.0).unwrap_or_default();
    Cookie::build(FLASH_COOKIE, URL_SAFE_NO_PAD.encode(json))
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .finish()
  }
}

impl FromRequest for FlashMessages {
  type Error = actix_web::Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(Ok(Self::from_cookies(req)))
  }
}

pub fn removal_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::new(FLASH_COOKIE, "");
  cookie.set_path("/");
  cookie.make_removal();
  cookie
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[actix_web::test]
  async fn reads_flash_cookie() {
    let cookie = FlashMessages::default()
      .push(Flash::new(FlashCategory::Success, "Sėkmingai!"))
      .into_cookie();
    let req = TestRequest::default().cookie(cookie).to_http_request();
    let flashes = FlashMessages::extract(&req).await.unwrap();
    assert_eq!(flashes.0, vec![Flash::new(FlashCategory::Success, "Sėkmingai!")]);
  }

  #[test]
  fn pushed_messages_keep_the_queue() {
    let first = FlashMessages::default()
      .push(Flash::new(FlashCategory::Success, "Pirmas"))
      .into_cookie();
    let req = TestRequest::default().cookie(first).to_http_request();
    let queued = FlashMessages::from_cookies(&req).push(Flash::new(FlashCategory::Info, "Antras"));
    assert_eq!(
      queued.0,
      vec![
        Flash::new(FlashCategory::Success, "Pirmas"),
        Flash::new(FlashCategory::Info, "Antras"),
      ]
    );
  }

  #[actix_web::test]
  async fn garbage_cookie_reads_as_empty() {
    let req = TestRequest::default()
      .cookie(Cookie::new(FLASH_COOKIE, "%%%"))
      .to_http_request();
    assert!(FlashMessages::extract(&req).await.unwrap().is_empty());
  }
}
