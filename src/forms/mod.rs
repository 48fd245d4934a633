//! Client-side form validation.
//!
//! Mirrors the checks the backend performs so obvious mistakes are reported
//! next to the field before a request is made. Every `validate` returns a
//! [`FieldErrors`]; an empty one means the form may be submitted.

mod catalog;
mod password;
mod shift;
mod user;

use std::collections::BTreeMap;

pub use catalog::{CabinetForm, NewsForm, NewsImage, ProcedureForm, RoomForm};
pub use password::generate_password;
pub use shift::ShiftForm;
pub use user::{FormMode, UserForm};

pub(crate) const REQUIRED: &str = "Обязательное поле";

/// Validation messages keyed by field name (camelCase, as sent to the backend).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. The first error reported for a field wins.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
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

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Required text no longer than `max` characters.
pub(crate) fn check_required_max(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    max: usize,
) {
    if value.trim().is_empty() {
        errors.insert(field, REQUIRED);
    } else {
        check_max(errors, field, value, max);
    }
}

/// Optional text no longer than `max` characters.
pub(crate) fn check_max(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.insert(field, format!("Максимум {} символов", max));
    }
}
