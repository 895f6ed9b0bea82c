// biudzetas/src/forms.rs

//! Form payloads posted by the HTML pages and their field-level validation.
//!
//! Field names on the wire match the form inputs in the templates. Every field has a
//! serde default so that a missing input produces an inline error instead of a 400.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NAME_MAX_LEN: usize = 20;
pub const EMAIL_MAX_LEN: usize = 120;
pub const PASSWORD_MIN_LEN: usize = 8;

const REQUIRED: &str = "Šis laukas privalomas.";

/// Validation messages keyed by form field name.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_string()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn field(&self, field: &str) -> &[String] {
    self.0.get(field).map(Vec::as_slice).unwrap_or_default()
  }
}

fn check_email(errors: &mut FormErrors, field: &str, email: &str) {
  let email = email.trim();
  if email.is_empty() {
    errors.add(field, REQUIRED);
  } else if email.len() > EMAIL_MAX_LEN {
    errors.add(field, format!("El. pašto adresas negali būti ilgesnis nei {} simbolių.", EMAIL_MAX_LEN));
  } else if !is_plausible_email(email) {
    errors.add(field, "Neteisingas el. pašto adresas.");
  }
}

fn is_plausible_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && !email.contains(char::is_whitespace)
    }
    None => false,
  }
}

fn check_new_password(errors: &mut FormErrors, password: &str, confirmation: &str) {
  if password.is_empty() {
    errors.add("slaptazodis", REQUIRED);
  } else if password.chars().count() < PASSWORD_MIN_LEN {
    errors.add(
      "slaptazodis",
      format!("Slaptažodis turi būti bent {} simbolių.", PASSWORD_MIN_LEN),
    );
  }
  if confirmation != password {
    errors.add("patvirtintas_slaptazodis", "Slaptažodžiai nesutampa.");
  }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct RegistrationForm {
  #[serde(default, rename = "vardas")]
  pub name: String,
  #[serde(default, rename = "el_pastas")]
  pub email: String,
  #[serde(default, rename = "slaptazodis", skip_serializing)]
  pub password: String,
  #[serde(default, rename = "patvirtintas_slaptazodis", skip_serializing)]
  pub password_confirmation: String,
}

impl RegistrationForm {
  /// Shape checks only; uniqueness is checked against the database by the caller.
  pub fn validate(&self) -> FormErrors {
    let mut errors = FormErrors::default();
    let name = self.name.trim();
    if name.is_empty() {
      errors.add("vardas", REQUIRED);
    } else if name.chars().count() > NAME_MAX_LEN {
      errors.add("vardas", format!("Vardas negali būti ilgesnis nei {} simbolių.", NAME_MAX_LEN));
    }
    check_email(&mut errors, "el_pastas", &self.email);
    check_new_password(&mut errors, &self.password, &self.password_confirmation);
    errors
  }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct LoginForm {
  #[serde(default, rename = "el_pastas")]
  pub email: String,
  #[serde(default, rename = "slaptazodis", skip_serializing)]
  pub password: String,
  // Checkbox: absent when unticked.
  #[serde(default, rename = "prisiminti")]
  pub remember: Option<String>,
}

impl LoginForm {
  pub fn remember(&self) -> bool {
    self.remember.is_some()
  }

  pub fn validate(&self) -> FormErrors {
    let mut errors = FormErrors::default();
    check_email(&mut errors, "el_pastas", &self.email);
    if self.password.is_empty() {
      errors.add("slaptazodis", REQUIRED);
    }
    errors
  }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct EntryForm {
  #[serde(default, rename = "irasas")]
  pub message: String,
}

impl EntryForm {
  pub fn validate(&self) -> FormErrors {
    let mut errors = FormErrors::default();
    if self.message.trim().is_empty() {
      errors.add("irasas", REQUIRED);
    }
    errors
  }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ResetRequestForm {
  #[serde(default, rename = "el_pastas")]
  pub email: String,
}

impl ResetRequestForm {
  pub fn validate(&self) -> FormErrors {
    let mut errors = FormErrors::default();
    check_email(&mut errors, "el_pastas", &self.email);
    errors
  }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PasswordResetForm {
  #[serde(default, rename = "slaptazodis")]
  pub password: String,
  #[serde(default, rename = "patvirtintas_slaptazodis")]
  pub password_confirmation: String,
}

impl PasswordResetForm {
  pub fn validate(&self) -> FormErrors {
    let mut errors = FormErrors::default();
    check_new_password(&mut errors, &self.password, &self.password_confirmation);
    errors
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registration(name: &str, email: &str, password: &str, confirmation: &str) -> RegistrationForm {
    RegistrationForm {
      name: name.to_string(),
      email: email.to_string(),
      password: password.to_string(),
      password_confirmation: confirmation.to_string(),
    }
  }

  #[test]
  fn valid_registration_has_no_errors() {
    assert!(registration("jonas", "jonas@pastas.lt", "slaptas123", "slaptas123").validate().is_empty());
  }

  #[test]
  fn registration_reports_each_field() {
    let errors = registration("", "ne-pastas", "trump", "kitas").validate();
    assert_eq!(errors.field("vardas"), [REQUIRED.to_string()]);
    assert_eq!(errors.field("el_pastas").len(), 1);
    assert_eq!(errors.field("slaptazodis").len(), 1);
    assert_eq!(errors.field("patvirtintas_slaptazodis").len(), 1);
  }

  #[test]
  fn name_length_is_counted_in_characters() {
    // 20 two-byte characters still fit.
    let name = "ž".repeat(NAME_MAX_LEN);
    assert!(registration(&name, "a@b.lt", "slaptas123", "slaptas123").validate().is_empty());
    let name = "ž".repeat(NAME_MAX_LEN + 1);
    assert!(!registration(&name, "a@b.lt", "slaptas123", "slaptas123").validate().is_empty());
  }

  #[test]
  fn email_shapes() {
    assert!(is_plausible_email("a@b.lt"));
    assert!(!is_plausible_email("a@b"));
    assert!(!is_plausible_email("@b.lt"));
    assert!(!is_plausible_email("a b@c.lt"));
    assert!(!is_plausible_email("a@.lt"));
  }

  #[test]
  fn blank_entry_is_rejected() {
    assert!(!EntryForm { message: "   ".to_string() }.validate().is_empty());
    assert!(EntryForm { message: "Pirkau duonos".to_string() }.validate().is_empty());
  }

  #[test]
  fn login_checkbox() {
    let form = LoginForm {
      remember: Some("y".to_string()),
      ..Default::default()
    };
    assert!(form.remember());
    assert!(!LoginForm::default().remember());
  }
}
