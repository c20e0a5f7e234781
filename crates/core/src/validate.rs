//! Boundary validation helper.
//!
//! Payload structs collect every field problem in one pass so callers get the
//! full list back instead of fixing one field per round trip.

use crate::error::{DomainError, DomainResult, FieldError};

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.reject(field, "must not be empty");
        }
        self
    }

    pub fn require_max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.reject(field, "must not be empty");
        } else if value.chars().count() > max {
            self.reject(field, format!("must be at most {max} characters"));
        }
        self
    }

    /// Basic shape check (`local@domain`), not RFC 5322.
    pub fn require_email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid {
            self.reject(field, "invalid email format");
        }
        self
    }

    pub fn optional_email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            if !v.trim().is_empty() {
                self.require_email(field, v);
            }
        }
        self
    }

    pub fn optional_non_negative(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if matches!(value, Some(v) if v < 0) {
            self.reject(field, "must not be negative");
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_failures() {
        let mut v = Validator::new();
        v.require("name", "  ")
            .require_email("email", "nope")
            .optional_non_negative("price", Some(-1));
        let err = v.finish().unwrap_err();
        let fields: Vec<_> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "price"]);
    }

    #[test]
    fn accepts_valid_input() {
        let mut v = Validator::new();
        v.require("name", "Acme")
            .require_email("email", "ops@acme.test")
            .optional_email("backup", None)
            .optional_non_negative("price", Some(0));
        assert!(v.is_valid());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn email_needs_both_parts() {
        for bad in ["@acme.test", "ops@", "a@b@c"] {
            let mut v = Validator::new();
            v.require_email("email", bad);
            assert!(!v.is_valid(), "{bad} should be rejected");
        }
    }

    #[test]
    fn max_len_counts_characters() {
        let mut v = Validator::new();
        v.require_max_len("name", "ééé", 3);
        assert!(v.is_valid());
        v.require_max_len("name", "éééé", 3);
        assert!(!v.is_valid());
    }
}
