//! Contact form validation.

use crate::models::message::contact_form::{ContactForm, NewContactMessage};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Field name to human-readable problem. Ordered so responses are stable.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 120;
pub const SUBJECT_MIN: usize = 3;
pub const SUBJECT_MAX: usize = 200;
pub const MESSAGE_MIN: usize = 10;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex compiles")
});

/// Loose syntactic email check.
pub fn is_valid_email(email: &str) -> bool {
  EMAIL_RE.is_match(email)
}

fn trimmed(v: &Option<String>) -> &str {
  v.as_deref().map(str::trim).unwrap_or("")
}

/// Check lengths in characters, not bytes.
fn check_len(
  errors: &mut FieldErrors,
  field: &'static str,
  label: &str,
  value: &str,
  min: usize,
  max: Option<usize>,
) {
  let n = value.chars().count();
  if n < min {
    errors.insert(field, format!("{label} must be at least {min} characters long"));
  } else if let Some(max) = max.filter(|m| n > *m) {
    errors.insert(field, format!("{label} must be at most {max} characters long"));
  }
}

/// Validate every field and return the trimmed submission, or all problems found.
pub fn validate_contact(form: &ContactForm) -> Result<NewContactMessage, FieldErrors> {
  let mut errors = FieldErrors::new();

  let name = trimmed(&form.name);
  check_len(&mut errors, "name", "Name", name, NAME_MIN, Some(NAME_MAX));

  // "Required" only for an absent or empty value; whitespace falls through to the format check.
  let email = trimmed(&form.email);
  if form.email.as_deref().is_none_or(str::is_empty) {
    errors.insert("email", "Email is required".to_string());
  } else if !is_valid_email(email) {
    errors.insert("email", "Please enter a valid email address".to_string());
  } else if email.chars().count() > EMAIL_MAX {
    errors.insert(
      "email",
      format!("Email must be at most {EMAIL_MAX} characters long"),
    );
  }

  let subject = trimmed(&form.subject);
  check_len(
    &mut errors,
    "subject",
    "Subject",
    subject,
    SUBJECT_MIN,
    Some(SUBJECT_MAX),
  );

  let message = trimmed(&form.message);
  check_len(&mut errors, "message", "Message", message, MESSAGE_MIN, None);

  if !errors.is_empty() {
    return Err(errors);
  }
  Ok(NewContactMessage {
    name: name.to_string(),
    email: email.to_string(),
    subject: subject.to_string(),
    message: message.to_string(),
  })
}
