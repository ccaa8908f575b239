//! Typed form state paired with [`Validate`] inputs.

use std::collections::BTreeSet;
use std::future::Future;

use crate::error::AppError;
use crate::validation::{Validate, ValidationErrors};

/// Values being edited, which fields the user has visited, and the
/// validation outcome. Errors for untouched fields stay hidden until the
/// first submit attempt.
#[derive(Debug, Clone)]
pub struct FormState<T> {
    initial: T,
    values: T,
    touched: BTreeSet<String>,
    errors: ValidationErrors,
    submitting: bool,
    submit_count: u32,
    submit_error: Option<AppError>,
}

impl<T: Validate + Clone> FormState<T> {
    pub fn new(initial: T) -> Self {
        let mut errors = ValidationErrors::default();
        initial.collect_errors(&mut errors);
        Self {
            values: initial.clone(),
            initial,
            touched: BTreeSet::new(),
            errors,
            submitting: false,
            submit_count: 0,
            submit_error: None,
        }
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    /// Edit one field; marks it touched and revalidates.
    pub fn set(&mut self, field: &str, edit: impl FnOnce(&mut T)) {
        edit(&mut self.values);
        self.touched.insert(field.to_string());
        self.revalidate();
    }

    /// Field lost focus.
    pub fn touch(&mut self, field: &str) {
        self.touched.insert(field.to_string());
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// All current errors, shown or not.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Error to display next to `field`.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        if self.submit_count > 0 || self.is_touched(field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Error returned by the last submit, validation failures included.
    pub fn submit_error(&self) -> Option<&AppError> {
        self.submit_error.as_ref()
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.initial.clone());
    }

    /// Validate, then hand a copy of the values to `submit`. Nothing is
    /// called while the form is invalid. Field errors returned by the
    /// submit closure are merged into the form.
    pub async fn submit<O, F, Fut>(&mut self, submit: F) -> Result<O, AppError>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<O, AppError>>,
    {
        self.submit_count += 1;
        self.revalidate();
        if !self.is_valid() {
            let err = AppError::Validation(self.errors.clone());
            self.submit_error = Some(err.clone());
            return Err(err);
        }

        self.submitting = true;
        self.submit_error = None;
        let result = submit(self.values.clone()).await;
        self.submitting = false;

        if let Err(ref e) = result {
            if let AppError::Validation(fields) = e {
                for (field, message) in fields.fields() {
                    self.errors.add(field, message);
                }
            }
            tracing::debug!(error = %e, "Form submit failed");
            self.submit_error = Some(e.clone());
        }
        result
    }

    fn revalidate(&mut self) {
        let mut errors = ValidationErrors::default();
        self.values.collect_errors(&mut errors);
        self.errors = errors;
    }
}

impl<T: Validate + Clone + PartialEq> FormState<T> {
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }
}
