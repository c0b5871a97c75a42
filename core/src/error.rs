//! Error types for the API client layer.
//!
//! # Design
//! None of these reach callers of the request envelope directly: the envelope
//! folds every failure into `ApiResponse::Failure`. They exist at the seams
//! where a fallible dependency is called (transport, environment).

use thiserror::Error;

/// Failure to obtain any HTTP response from the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The reqwest client failed to send the request or read the body.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A non-reqwest transport could not complete the round trip.
    #[error("transport failed: {0}")]
    Other(String),
}

/// Invalid or missing client configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} is blank")]
    BlankVar(&'static str),
}
