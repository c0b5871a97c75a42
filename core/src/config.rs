//! Ambient configuration handed explicitly to the request envelope.
//!
//! `ClientConfig` is process-wide (where the backend lives); `RequestContext`
//! is per incoming request (who is asking). Neither is read from global state
//! at call time.

use crate::error::ConfigError;

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_VAR: &str = "BACKEND_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    backend_url: String,
}

impl ClientConfig {
    /// A trailing `/` on `backend_url` is stripped.
    pub fn new(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read the backend URL from `BACKEND_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(BACKEND_URL_VAR).ok_or(ConfigError::MissingVar(BACKEND_URL_VAR))?;
        if url.trim().is_empty() {
            return Err(ConfigError::BlankVar(BACKEND_URL_VAR));
        }
        Ok(Self::new(url.trim()))
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }
}

/// Values scoped to the incoming request being served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    access_token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A blank token is treated as no token.
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            access_token: (!token.trim().is_empty()).then_some(token),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:8000/");
        assert_eq!(config.backend_url(), "http://localhost:8000");
    }

    #[test]
    fn lookup_reads_backend_url() {
        let config = ClientConfig::from_lookup(|name| {
            (name == BACKEND_URL_VAR).then(|| "http://backend:9000".to_string())
        })
        .unwrap();
        assert_eq!(config.backend_url(), "http://backend:9000");
    }

    #[test]
    fn missing_backend_url_is_an_error() {
        let err = ClientConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(BACKEND_URL_VAR));
    }

    #[test]
    fn blank_backend_url_is_an_error() {
        let err = ClientConfig::from_lookup(|_| Some("  ".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::BlankVar(BACKEND_URL_VAR));
    }

    #[test]
    fn blank_token_counts_as_absent() {
        assert_eq!(RequestContext::with_access_token("").access_token(), None);
        assert_eq!(
            RequestContext::with_access_token("abc").access_token(),
            Some("abc")
        );
        assert_eq!(RequestContext::anonymous().access_token(), None);
    }
}
