//! Server-side client layer for the backend API.
//!
//! # Overview
//! Proxies calls to the backend, rewrites field names between the backend's
//! snake_case and the frontend's camelCase, and maps backend error payloads
//! onto page errors and form-validation state.
//!
//! # Design
//! - `Resource` is the request envelope: `build_request` and `parse_response`
//!   are pure, `request` joins them with one `Transport` round trip and never
//!   fails; every outcome is an `ApiResponse`.
//! - Configuration (`ClientConfig`) and per-request values (`RequestContext`)
//!   are passed in explicitly rather than read from ambient state.
//! - `handle_error` is the only place a failure becomes a user-facing
//!   `HandleableError`; `handle_load_error` and `handle_form_error` adapt it to
//!   page rendering and form binding.

pub mod case;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod products;
pub mod resource;

pub use case::{keys_to_camel_case, keys_to_snake_case};
pub use classify::{
    handle_error, handle_form_error, handle_load_error, ErrorCode, ErrorHandler,
    HandleableError, PageError,
};
pub use client::ApiClient;
pub use config::{ClientConfig, RequestContext};
pub use error::{ConfigError, TransportError};
pub use form::{ActionFailure, FormErrorState, FormErrors};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use products::{CreateProduct, Product, ProductResource, UpdateProduct};
pub use resource::{ApiFailure, ApiResponse, CacheMode, RequestOptions, Resource, NO_BODY};
