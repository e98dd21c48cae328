//! The single chokepoint for outbound calls to the remote service.
//!
//! Every call goes through one pipeline:
//! 1. snapshot the current identity (headers + session epoch)
//! 2. merge headers: default content type, then identity, then caller overrides
//! 3. send, then read the whole body
//! 4. non-2xx is a failure whatever the body holds; the body's `error`
//!    field becomes the message when present
//! 5. a response whose session epoch has moved on is discarded (per policy)
//!
//! There are no retries. Each call is bounded by the configured timeout, and
//! dropping the returned future cancels the request.

mod auth;
mod files;
mod resources;

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use assetctl_auth::AuthHeaders;
use assetctl_core::error::parse_json_body;
use assetctl_core::{ServiceError, ServiceResult};

use crate::config::{ClientConfig, StalePolicy};
use crate::context::AuthContext;

pub use files::join_file_url;
pub use resources::Resource;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of an outbound request.
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Multipart bodies never get a declared content type: the transport
    /// writes it together with the boundary parameter.
    Multipart(reqwest::multipart::Form),
}

impl RequestBody {
    fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// One logical request to the remote service.
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Caller-supplied header; wins over defaults and identity headers.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Outbound request gateway.
///
/// Cheap to clone; clones share the HTTP connection pool and the identity.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: Arc<str>,
    auth: AuthContext,
    stale: StalePolicy,
}

impl Gateway {
    pub fn new(config: &ClientConfig, auth: AuthContext) -> ServiceResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ServiceError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: Arc::from(config.base_url()),
            auth,
            stale: config.stale_responses,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_context(&self) -> &AuthContext {
        &self.auth
    }

    /// Send a request and parse the body as JSON.
    ///
    /// A 2xx body that is empty or not JSON yields `Ok(None)`.
    pub async fn send_json(&self, request: ApiRequest) -> ServiceResult<Option<Value>> {
        let body = self.execute(request).await?;
        Ok(parse_json_body(&body))
    }

    /// Send a request and return the raw body without interpreting it.
    pub async fn send_binary(&self, request: ApiRequest) -> ServiceResult<Bytes> {
        self.execute(request).await
    }

    async fn execute(&self, request: ApiRequest) -> ServiceResult<Bytes> {
        let snapshot = self.auth.snapshot();
        let request_id = Uuid::now_v7();
        // Path only: query strings may carry reset tokens.
        let span = tracing::info_span!(
            "gateway",
            %request_id,
            method = %request.method,
            path = %request.path,
            epoch = snapshot.epoch,
        );

        async move {
            let started = Instant::now();
            let result = self.dispatch(request, snapshot.headers.as_ref()).await;

            if self.stale == StalePolicy::Discard && self.auth.epoch() != snapshot.epoch {
                tracing::warn!("session changed while in flight; discarding response");
                return Err(ServiceError::stale_session());
            }

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(body) => tracing::info!(elapsed_ms, bytes = body.len(), "request completed"),
                Err(err) => tracing::warn!(
                    elapsed_ms,
                    status = err.status,
                    error = %err.message,
                    "request failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: ApiRequest, auth: Option<&AuthHeaders>) -> ServiceResult<Bytes> {
        let ApiRequest {
            method,
            path,
            query,
            body,
            headers,
        } = request;

        let headers = merge_headers(body.is_multipart(), auth, headers);
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http.request(method, url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(ServiceError::from_response(status.as_u16(), &body))
        }
    }
}

/// Merge header sets in fixed precedence: default content type, identity,
/// then caller overrides (last writer wins).
fn merge_headers(multipart: bool, auth: Option<&AuthHeaders>, overrides: HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if !multipart {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    if let Some(auth) = auth {
        for (name, value) in auth.pairs() {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = name, "identity header value is not sendable; skipped"),
            }
        }
    }

    let mut last: Option<HeaderName> = None;
    for (name, value) in overrides {
        let name = match name {
            Some(name) => {
                last = Some(name.clone());
                name
            }
            None => match &last {
                Some(name) => {
                    headers.append(name.clone(), value);
                    continue;
                }
                None => continue,
            },
        };
        if multipart && name == CONTENT_TYPE {
            tracing::debug!("ignoring content-type override on a multipart request");
            continue;
        }
        headers.insert(name, value);
    }

    headers
}

fn transport_error(err: reqwest::Error) -> ServiceError {
    let err = err.without_url();
    if err.is_timeout() {
        ServiceError::transport("request timed out")
    } else if err.is_connect() {
        ServiceError::transport(format!("could not reach the service: {err}"))
    } else {
        ServiceError::transport(format!("network error: {err}"))
    }
}
