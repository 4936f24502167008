//! Request-shape checks run by handlers before any business logic.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9-]+$").unwrap();
    static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

pub fn is_valid_url(url: &str) -> bool {
    URL_RE.is_match(url)
}

/// Accumulates field errors; `finish` turns any of them into `AppError::Validation`.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &'static str, reason: String) {
        self.errors.push(FieldError { field, reason });
    }

    pub fn required(&mut self, field: &'static str, label: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(field, format!("{label} is required"));
            return false;
        }
        true
    }

    pub fn length(&mut self, field: &'static str, label: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            self.push(field, format!("{label} must be at least {min} characters"));
        } else if len > max {
            self.push(field, format!("{label} must not exceed {max} characters"));
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) {
        if !is_valid_email(value) {
            self.push(field, "Please provide a valid email address".into());
        }
    }

    pub fn slug(&mut self, field: &'static str, value: &str) {
        if !is_valid_slug(value) {
            self.push(
                field,
                "Slug must contain only lowercase letters, numbers, and hyphens".into(),
            );
        }
    }

    pub fn url(&mut self, field: &'static str, label: &str, value: &str) {
        if !is_valid_url(value) {
            self.push(field, format!("{label} must be a valid URL"));
        }
    }

    pub fn uuids(&mut self, field: &'static str, label: &str, values: &[String]) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(values.len());
        for raw in values {
            match Uuid::parse_str(raw) {
                Ok(id) => ids.push(id),
                Err(_) => {
                    self.push(field, format!("{label} must be a valid UUID"));
                    break;
                }
            }
        }
        ids
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
