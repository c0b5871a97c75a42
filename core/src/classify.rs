//! Error classifier: turns a failed envelope call into a user-facing error.
//!
//! # Design
//! `handle_error` is the single place where an `ApiFailure` becomes a
//! `HandleableError`. Rules are checked in order:
//! 1. a caller-supplied handler that returns `Some` wins outright;
//! 2. 422 with a non-empty `errors` map → first field, first message,
//!    reported with status 400;
//! 3. 403 → a fixed authorization error, payload ignored;
//! 4. anything else → a fixed unknown error, logged with the raw failure.
//!
//! A 422 whose `errors` map is empty, absent or malformed falls through to
//! rule 4.

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::error;

use crate::form::{ActionFailure, FormErrors};
use crate::resource::ApiFailure;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized action";
pub const UNAUTHORIZED_DESCRIPTION: &str =
    "You are not allowed to access or modify this resource!";
pub const UNKNOWN_MESSAGE: &str = "An unknown error occurred.";

/// Status reported for backend validation failures (received as 422).
pub const VALIDATION_STATUS: u16 = 400;

/// Call-site hook consulted before the built-in rules.
pub type ErrorHandler<'a> = &'a dyn Fn(&ApiFailure) -> Option<HandleableError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    Unknown,
    Validation,
    Authorization,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::Unknown => "unknown",
            ErrorCode::Validation => "validation",
            ErrorCode::Authorization => "authorization",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "unknown" => ErrorCode::Unknown,
            "validation" => ErrorCode::Validation,
            "authorization" => ErrorCode::Authorization,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized, user-facing description of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleableError {
    pub message: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl HandleableError {
    pub fn new(message: impl Into<String>, code: impl Into<ErrorCode>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            description: None,
            status: None,
            field: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

pub fn handle_error(failure: &ApiFailure, handler: Option<ErrorHandler<'_>>) -> HandleableError {
    if let Some(handled) = handler.and_then(|handler| handler(failure)) {
        return handled;
    }

    let classified = match failure.status {
        422 => first_validation_error(failure),
        403 => Some(
            HandleableError::new(UNAUTHORIZED_MESSAGE, ErrorCode::Authorization)
                .with_description(UNAUTHORIZED_DESCRIPTION)
                .with_status(403),
        ),
        _ => None,
    };

    classified.unwrap_or_else(|| {
        error!(status = failure.status, payload = %failure.payload, "unhandled backend error");
        HandleableError::new(UNKNOWN_MESSAGE, ErrorCode::Unknown).with_status(500)
    })
}

/// First field of `payload.errors` in wire order, with its first message.
fn first_validation_error(failure: &ApiFailure) -> Option<HandleableError> {
    let (field, messages) = failure.payload.get("errors")?.as_object()?.iter().next()?;
    let message = messages.as_array()?.first()?.as_str()?;
    Some(
        HandleableError::new(message, ErrorCode::Validation)
            .with_status(VALIDATION_STATUS)
            .with_field(field.as_str()),
    )
}

/// Fatal error for the current page render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page failed with status {status}: {}", .error.message)]
pub struct PageError {
    pub status: u16,
    pub error: HandleableError,
}

/// Classify `failure` and abort the page render with it.
///
/// Always returns `Err`; callers `return` the result.
pub fn handle_load_error<T>(
    failure: &ApiFailure,
    handler: Option<ErrorHandler<'_>>,
) -> Result<T, PageError> {
    let error = handle_error(failure, handler);
    Err(PageError {
        status: error.status.unwrap_or(500),
        error,
    })
}

/// Classify `failure` and attach it to `form`.
///
/// The message goes to the classified field, else to `default_field`, else to
/// the form as a whole. Empty field names count as absent.
pub fn handle_form_error<F>(
    form: &mut F,
    failure: &ApiFailure,
    default_field: Option<&str>,
    handler: Option<ErrorHandler<'_>>,
) -> ActionFailure
where
    F: FormErrors + ?Sized,
{
    let error = handle_error(failure, handler);
    let field = error
        .field
        .as_deref()
        .filter(|field| !field.is_empty())
        .or(default_field.filter(|field| !field.is_empty()));

    match field {
        Some(field) => form.set_field_error(field, &error.message),
        None => form.set_form_error(&error.message),
    }
    ActionFailure::default()
}
