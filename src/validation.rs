use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::AppError;

/// Field-keyed validation failures. One message per field; the first
/// failing rule for a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing failed, otherwise `AppError::Validation`.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Client-side validation run before a write request leaves the process.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        self.collect_errors(&mut errors);
        errors.into_result()
    }

    fn collect_errors(&self, errors: &mut ValidationErrors);
}

/// Unit inputs (e.g. `delete(id)`) have nothing to check.
impl Validate for () {
    fn collect_errors(&self, _errors: &mut ValidationErrors) {}
}

// ============================================================================
// Rules
// ============================================================================

pub fn require_non_empty(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{field} cannot be empty"));
    }
}

/// Like [`require_non_empty`] but only when the optional value is present.
pub fn optional_non_empty(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        require_non_empty(errors, field, v);
    }
}

pub fn require_valid_id(errors: &mut ValidationErrors, field: &str, value: i64) {
    if value <= 0 {
        errors.add(field, format!("{field} must be a valid ID"));
    }
}

pub fn require_non_negative(errors: &mut ValidationErrors, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.add(field, format!("{field} must be a non-negative amount"));
    }
}

pub fn require_positive(errors: &mut ValidationErrors, field: &str, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.add(field, format!("{field} must be greater than zero"));
    }
}

pub fn require_range(errors: &mut ValidationErrors, field: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() || value < min || value > max {
        errors.add(field, format!("{field} must be between {min} and {max}"));
    }
}

/// Billing periods are `YYYY-MM`.
pub fn require_period(errors: &mut ValidationErrors, field: &str, value: &str) {
    let valid = chrono::NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok()
        && value.len() == 7;
    if !valid {
        errors.add(field, format!("{field} must be a period in YYYY-MM format"));
    }
}

/// Calendar dates are `YYYY-MM-DD`.
pub fn require_date(errors: &mut ValidationErrors, field: &str, value: &str) {
    if chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        errors.add(field, format!("{field} must be a date in YYYY-MM-DD format"));
    }
}
