//! HTTP transport for the knowledge API.
//!
//! A [`Transport`] owns one `reqwest::Client` and the [`Credentials`]. Every
//! call attaches `Authorization: Bearer <key>`, performs exactly one round
//! trip, and classifies the outcome:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | `204 No Content` | `Ok({"success": true})`, body never read |
//! | other `< 400` | `Ok(parsed JSON)`, or `Ok({"response": <raw text>})` if not JSON |
//! | `>= 400` | `Err(ApiError)` from the body's `message`/`code` (defaults `"API error: <status>"` / `"unknown_error"`) |
//! | no response | `Err(ApiError { code: "request_error", status: 0 })` |
//! | body unreadable | `Err(ApiError { code: "request_error", status })` with the received status |
//!
//! There is no retry and no backoff. The only tunable is an optional
//! per-request timeout.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Credentials;
use crate::error::{ApiError, Error, Result};

/// Request body variants. At most one kind of body is sent per request.
#[derive(Debug)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart(MultipartUpload),
}

impl Body {
    fn kind(&self) -> &'static str {
        match self {
            Body::Empty => "empty",
            Body::Json(_) => "json",
            Body::Multipart(_) => "multipart",
        }
    }
}

/// A two-part upload: a `data` part carrying JSON metadata as a string and a
/// `file` part carrying the raw bytes under their original file name.
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    pub data: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MultipartUpload {
    fn into_form(self) -> Result<Form> {
        let data = Part::text(self.data)
            .file_name("data")
            .mime_str("text/plain")
            .map_err(|e| Error::InvalidArgument(format!("invalid data part: {}", e)))?;
        let file = Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| Error::InvalidArgument(format!("invalid file part: {}", e)))?;

        Ok(Form::new().part("data", data).part("file", file))
    }
}

/// Authenticated HTTP transport. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    credentials: Credentials,
}

impl Transport {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_timeout(credentials, None)
    }

    /// Build a transport whose requests time out after `timeout`.
    pub fn with_timeout(credentials: Credentials, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, credentials })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Issue one request against `path` (relative, leading slash) and
    /// classify the response.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<Value> {
        let url = format!("{}{}", self.credentials.base_url(), path);
        debug!(method = %method, path, body = body.kind(), "sending request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(self.credentials.api_key());

        if !query.is_empty() {
            request = request.query(query);
        }

        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            // reqwest sets the multipart content type with its boundary.
            Body::Multipart(upload) => request.multipart(upload.into_form()?),
        };

        let response = request.send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        debug!(method = %method, path, status, "received response");

        if status == 204 {
            return Ok(success_sentinel());
        }

        let text = response
            .text()
            .await
            .map_err(|e| body_error(e, status))?;
        classify(status, &text).map_err(|e| {
            warn!(method = %method, path, status = e.status, code = %e.code, "request rejected");
            Error::Api(e)
        })
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.send(Method::GET, path, query, Body::Empty).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value> {
        let body = Body::Json(serde_json::to_value(body)?);
        self.send(Method::POST, path, &[], body).await
    }

    /// POST without a body.
    pub async fn post_empty(&self, path: &str) -> Result<Value> {
        self.send(Method::POST, path, &[], Body::Empty).await
    }

    pub async fn post_multipart(&self, path: &str, upload: MultipartUpload) -> Result<Value> {
        self.send(Method::POST, path, &[], Body::Multipart(upload))
            .await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value> {
        let body = Body::Json(serde_json::to_value(body)?);
        self.send(Method::PATCH, path, &[], body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, &[], Body::Empty).await
    }
}

fn success_sentinel() -> Value {
    json!({ "success": true })
}

/// The status line arrived but the body could not be read. The status is
/// kept so the failure is not mistaken for one with no response at all.
fn body_error(err: impl std::fmt::Display, status: u16) -> Error {
    warn!(error = %err, status, "failed to read response body");
    Error::Api(ApiError::new(
        format!("Failed to read response body: {}", err),
        "request_error",
        status,
    ))
}

fn request_error(err: reqwest::Error) -> Error {
    warn!(error = %err, "request failed before a response was received");
    Error::Api(ApiError::new(
        format!("Request failed: {}", err),
        "request_error",
        0,
    ))
}

/// Classify a received response by status code and raw body text.
///
/// Non-JSON bodies never fail classification on their own: they are wrapped
/// as `{"response": <text>}`.
pub fn classify(status: u16, text: &str) -> std::result::Result<Value, ApiError> {
    if status == 204 {
        return Ok(success_sentinel());
    }

    let data: Value =
        serde_json::from_str(text).unwrap_or_else(|_| json!({ "response": text }));

    if status >= 400 {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("API error: {}", status));
        let code = data
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();
        return Err(ApiError::new(message, code, status));
    }

    Ok(data)
}
