//! Declarative checks over submitted form fields.
//!
//! Every check runs regardless of earlier failures; messages accumulate per
//! field and [`Form::valid`] reports whether any were recorded.

mod errors;

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub use errors::FormErrors;

lazy_static! {
    pub static ref EMAIL_RE: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .unwrap();
}

/// Key for errors that belong to the form as a whole rather than one field.
pub const GENERIC_ERROR: &str = "generic";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    values: HashMap<String, String>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// Raw value of `field`, or "" when it was not submitted.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, "This field can't be blank");
            }
        }
    }

    /// Counts chars, not bytes. Empty values are left to `required`.
    pub fn max_length(&mut self, field: &str, n: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() > n {
            self.errors.add(
                field,
                format!("This field is too long. Maximum length is {} characters", n),
            );
        }
    }

    pub fn min_length(&mut self, field: &str, n: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() < n {
            self.errors.add(
                field,
                format!("This field is too short. Minimum length is {} characters", n),
            );
        }
    }

    pub fn permitted_values(&mut self, field: &str, options: &[&str]) {
        let value = self.get(field);
        if !options.iter().any(|opt| *opt == value) {
            self.errors.add(field, "This field is invalid");
        }
    }

    pub fn matches_pattern(&mut self, field: &str, pattern: &Regex) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if !pattern.is_match(value) {
            self.errors.add(field, "This field is invalid");
        }
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}
