//! Client-side form validation. Runs before any request is issued; errors
//! are keyed by wire field name so they can be shown next to the field.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[\d\s-]+$").expect("phone regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &str, value: Option<&str>, message: &str) {
        if is_blank(value) {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Payloads that are checked before submission.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name is required");
        errors.add("name", "Name is too long");
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn formats() {
        assert!(is_email("alice@x.com"));
        assert!(!is_email("alice@x"));
        assert!(!is_email("a lice@x.com"));
        assert!(is_phone("+1 555-0100"));
        assert!(!is_phone("555-CALL"));
        assert!(is_blank(Some("   ")));
        assert!(is_blank(None));
    }
}
