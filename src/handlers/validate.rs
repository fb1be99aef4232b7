// handlers/validate.rs - Request field validation shared by all handlers
//
// Format and range rules are `validator` attributes on the request structs.
// What lives here is the rest: trimming, presence of required fields and
// decimal bounds. Problems are collected per field and reported together as
// one 400 response.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::error::{field_errors, ApiError, FieldErrors};

/// Largest price a `NUMERIC(12, 2)` column holds
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// `deserialize_with` for optional text fields: surrounding whitespace is dropped
pub fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()))
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, problem: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| problem.into());
    }

    /// Runs the request's `validator` rules
    pub fn check(&mut self, request: &impl Validate) {
        if let Err(errors) = request.validate() {
            for (field, problem) in field_errors(&errors) {
                self.add(&field, problem);
            }
        }
    }

    /// Required text. Returns an empty string when missing or blank; the
    /// value itself is passed through as given.
    pub fn required(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                self.add(field, "is required");
                String::new()
            }
        }
    }

    pub fn price(&mut self, field: &str, value: Option<Decimal>) -> Option<Decimal> {
        let value = value?.round_dp(2);
        if value.is_sign_negative() || value > max_price() {
            self.add(field, format!("must be between 0 and {}", max_price()));
            return None;
        }
        Some(value)
    }

    /// `Err(ValidationError)` carrying every recorded problem
    pub fn finish(self, message: &str) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, Some(self.errors)))
        }
    }
}
