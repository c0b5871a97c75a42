//! Form-state seam for binding classified errors to a submitted form.

use std::collections::BTreeMap;

use serde::Serialize;

/// A form whose validation state can receive backend errors.
pub trait FormErrors {
    fn set_field_error(&mut self, field: &str, message: &str);
    fn set_form_error(&mut self, message: &str);
}

/// In-memory form error state. Messages accumulate per field and for the
/// form as a whole, in the order they were set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrorState {
    fields: BTreeMap<String, Vec<String>>,
    form: Vec<String>,
}

impl FormErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_errors(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn form_errors(&self) -> &[String] {
        &self.form
    }

    pub fn is_valid(&self) -> bool {
        self.fields.is_empty() && self.form.is_empty()
    }
}

impl FormErrors for FormErrorState {
    fn set_field_error(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn set_form_error(&mut self, message: &str) {
        self.form.push(message.to_string());
    }
}

/// Result of a form action that was rejected after errors were attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFailure {
    pub status: u16,
}

impl ActionFailure {
    pub const DEFAULT_STATUS: u16 = 400;
}

impl Default for ActionFailure {
    fn default() -> Self {
        Self {
            status: Self::DEFAULT_STATUS,
        }
    }
}
