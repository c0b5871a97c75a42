//! Request envelope: one backend call in, one tagged result out.
//!
//! # Design
//! `Resource` holds the ambient configuration, the caller's request context
//! and the path prefix of one resource family. Each call is split into
//! `build_request` (pure, produces an `HttpRequest`) and `parse_response`
//! (pure, consumes an `HttpResponse`), joined by `request`, which performs the
//! single round trip through a `Transport`.
//!
//! `request` never fails. Every outcome is an `ApiResponse`:
//! - no HTTP response, an unparseable body, or a body that does not decode
//!   into `T` → `Failure` with status 0 and `{"message": ...}` as payload;
//! - a non-2xx response → `Failure` with that status and the camelCased body;
//! - otherwise `Success` with the camelCased body decoded into `T`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::case::{keys_to_camel_case, keys_to_snake_case};
use crate::config::{ClientConfig, RequestContext};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Body argument for calls that send none.
pub const NO_BODY: Option<&()> = None;

/// Outcome of one envelope call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(ApiFailure),
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            ApiResponse::Success(payload) => Ok(payload),
            ApiResponse::Failure(failure) => Err(failure),
        }
    }

    pub fn success(self) -> Option<T> {
        self.into_result().ok()
    }

    pub fn failure(self) -> Option<ApiFailure> {
        self.into_result().err()
    }
}

/// Failed envelope call. Status 0 means no usable HTTP response was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: u16,
    pub payload: Value,
}

impl ApiFailure {
    pub const TRANSPORT_STATUS: u16 = 0;

    pub fn transport(error: impl fmt::Display) -> Self {
        Self {
            status: Self::TRANSPORT_STATUS,
            payload: json!({ "message": error.to_string() }),
        }
    }

    pub fn is_transport(&self) -> bool {
        self.status == Self::TRANSPORT_STATUS
    }
}

/// Cache behaviour requested from intermediaries, sent as `Cache-Control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    NoStore,
    NoCache,
    Reload,
}

impl CacheMode {
    fn header_value(self) -> &'static str {
        match self {
            CacheMode::NoStore => "no-store",
            CacheMode::NoCache | CacheMode::Reload => "no-cache",
        }
    }
}

/// Per-call overrides. Header names collide case-insensitively and the
/// caller's value wins over every default, `Authorization` included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub cache: Option<CacheMode>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn cache(mut self, mode: CacheMode) -> Self {
        self.cache = Some(mode);
        self
    }
}

/// One resource family of the backend, mounted under `base_path`.
#[derive(Debug, Clone)]
pub struct Resource<Tr> {
    config: ClientConfig,
    context: RequestContext,
    base_path: String,
    transport: Tr,
}

impl<Tr> Resource<Tr> {
    pub fn new(
        config: ClientConfig,
        context: RequestContext,
        base_path: &str,
        transport: Tr,
    ) -> Self {
        Self {
            config,
            context,
            base_path: base_path.to_string(),
            transport,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Build the request for `method` on `base_url + base_path + path`.
    ///
    /// `body` is camelCase-serialized, rewritten to snake_case and sent as
    /// JSON text. Only a body that cannot be represented as JSON fails.
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiFailure>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        if let Some(token) = self.context.access_token() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if let Some(cache) = options.cache {
            set_header(&mut headers, "Cache-Control", cache.header_value());
        }
        for (name, value) in &options.headers {
            set_header(&mut headers, name, value);
        }

        let body = match body {
            Some(body) => {
                let value = serde_json::to_value(body).map_err(ApiFailure::transport)?;
                Some(keys_to_snake_case(value).to_string())
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: format!("{}{}{}", self.config.backend_url(), self.base_path, path),
            headers,
            body,
        })
    }

    /// Classify a received response. An empty body reads as JSON `null`.
    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> ApiResponse<T> {
        let json = match parse_body(&response.body) {
            Ok(value) => keys_to_camel_case(value),
            Err(e) => return ApiResponse::Failure(ApiFailure::transport(e)),
        };

        if !response.is_success() {
            return ApiResponse::Failure(ApiFailure {
                status: response.status,
                payload: json,
            });
        }

        match serde_json::from_value(json) {
            Ok(payload) => ApiResponse::Success(payload),
            Err(e) => ApiResponse::Failure(ApiFailure::transport(e)),
        }
    }
}

impl<Tr: Transport> Resource<Tr> {
    /// Perform one backend call. Never fails; see the module docs.
    pub async fn request<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = match self.build_request(method, path, body, &options) {
            Ok(request) => request,
            Err(failure) => return ApiResponse::Failure(failure),
        };
        debug!(method = %request.method, url = %request.url, "sending backend request");

        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(status = response.status, "backend responded");
                self.parse_response(response)
            }
            Err(e) => {
                warn!(error = %e, "backend request failed without a response");
                ApiResponse::Failure(ApiFailure::transport(e))
            }
        }
    }
}

fn parse_body(body: &str) -> Result<Value, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(entry) => *entry = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;

    use super::*;
    use crate::error::TransportError;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Widget {
        product_name: String,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct NewWidget {
        product_name: String,
        unit_price: u32,
    }

    /// Replies with a fixed outcome and records every request it sees.
    struct CannedTransport {
        reply: Result<HttpResponse, String>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: Err("connection refused".to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().map_err(TransportError::Other)
        }
    }

    fn resource<Tr>(context: RequestContext, transport: Tr) -> Resource<Tr> {
        Resource::new(
            ClientConfig::new("http://backend:8000"),
            context,
            "/products",
            transport,
        )
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn url_joins_base_url_base_path_and_path() {
        let req = resource(RequestContext::anonymous(), ())
            .build_request(HttpMethod::Get, "/42", NO_BODY, &RequestOptions::default())
            .unwrap();
        assert_eq!(req.url, "http://backend:8000/products/42");
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
    }

    #[test]
    fn default_headers_without_token() {
        let req = resource(RequestContext::anonymous(), ())
            .build_request(HttpMethod::Get, "", NO_BODY, &RequestOptions::default())
            .unwrap();
        assert_eq!(
            req.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn bearer_token_is_added_from_context() {
        let req = resource(RequestContext::with_access_token("t0k"), ())
            .build_request(HttpMethod::Get, "", NO_BODY, &RequestOptions::default())
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer t0k"));
    }

    #[test]
    fn caller_headers_win_case_insensitively() {
        let options = RequestOptions::default()
            .header("accept", "text/plain")
            .header("authorization", "Basic abc")
            .header("X-Trace", "1");
        let req = resource(RequestContext::with_access_token("t0k"), ())
            .build_request(HttpMethod::Get, "", NO_BODY, &options)
            .unwrap();
        assert_eq!(req.headers.len(), 4);
        assert_eq!(req.header("Accept"), Some("text/plain"));
        assert_eq!(req.header("Authorization"), Some("Basic abc"));
        assert_eq!(req.header("x-trace"), Some("1"));
    }

    #[test]
    fn cache_mode_sets_cache_control() {
        let options = RequestOptions::default().cache(CacheMode::NoStore);
        let req = resource(RequestContext::anonymous(), ())
            .build_request(HttpMethod::Get, "", NO_BODY, &options)
            .unwrap();
        assert_eq!(req.header("cache-control"), Some("no-store"));
    }

    #[test]
    fn body_is_sent_as_snake_case_json() {
        let body = NewWidget {
            product_name: "Widget".to_string(),
            unit_price: 5,
        };
        let req = resource(RequestContext::anonymous(), ())
            .build_request(HttpMethod::Post, "", Some(&body), &RequestOptions::default())
            .unwrap();
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"product_name": "Widget", "unit_price": 5}));
    }

    #[test]
    fn success_body_is_camel_cased_into_payload() {
        let parsed: ApiResponse<Widget> = resource(RequestContext::anonymous(), ())
            .parse_response(response(200, r#"{"product_name":"Widget"}"#));
        assert_eq!(
            parsed,
            ApiResponse::Success(Widget {
                product_name: "Widget".to_string()
            })
        );
    }

    #[test]
    fn error_status_keeps_status_and_camel_cased_body() {
        let parsed: ApiResponse<Widget> = resource(RequestContext::anonymous(), ())
            .parse_response(response(422, r#"{"errors":{"product_name":["is blank"]}}"#));
        let failure = parsed.failure().unwrap();
        assert_eq!(failure.status, 422);
        assert_eq!(failure.payload, json!({"errors": {"productName": ["is blank"]}}));
    }

    #[test]
    fn unparseable_body_is_a_transport_failure() {
        let parsed: ApiResponse<Widget> = resource(RequestContext::anonymous(), ())
            .parse_response(response(500, "<html>oops</html>"));
        assert!(parsed.failure().unwrap().is_transport());
    }

    #[test]
    fn payload_of_the_wrong_shape_is_a_transport_failure() {
        let parsed: ApiResponse<Widget> = resource(RequestContext::anonymous(), ())
            .parse_response(response(200, r#"{"unrelated":true}"#));
        let failure = parsed.failure().unwrap();
        assert_eq!(failure.status, 0);
        assert!(failure.payload["message"].is_string());
    }

    #[test]
    fn empty_body_reads_as_null() {
        let parsed: ApiResponse<()> =
            resource(RequestContext::anonymous(), ()).parse_response(response(204, ""));
        assert_eq!(parsed, ApiResponse::Success(()));
    }

    #[tokio::test]
    async fn request_performs_exactly_one_round_trip() {
        let r = resource(
            RequestContext::anonymous(),
            CannedTransport::replying(200, r#"{"product_name":"Widget"}"#),
        );
        let out: ApiResponse<Widget> = r
            .request(HttpMethod::Get, "/1", NO_BODY, RequestOptions::default())
            .await;
        assert!(out.is_success());
        let seen = r.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://backend:8000/products/1");
    }

    #[tokio::test]
    async fn transport_error_becomes_status_zero() {
        let r = resource(RequestContext::anonymous(), CannedTransport::unreachable());
        let out: ApiResponse<Widget> = r
            .request(HttpMethod::Get, "", NO_BODY, RequestOptions::default())
            .await;
        let failure = out.failure().unwrap();
        assert_eq!(failure.status, ApiFailure::TRANSPORT_STATUS);
        assert_eq!(
            failure.payload,
            json!({"message": "transport failed: connection refused"})
        );
    }
}
