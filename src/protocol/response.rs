//! Response definitions
//!
//! Represents responses to clients.

use bytes::Bytes;
use serde::Serialize;

/// Reason phrase for a status code
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A response to send to client
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    content_type: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Serialize `body` as JSON; a serialization failure becomes a 500
    pub fn json<T: Serialize + ?Sized>(status: u16, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => Self::new(status, JSON_CONTENT_TYPE, bytes),
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                Self::error(500, "Internal Server Error")
            }
        }
    }

    /// `{"error": message}`
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status, JSON_CONTENT_TYPE, body)
    }

    pub fn binary(content_type: &str, body: impl Into<Bytes>) -> Self {
        Self::new(200, content_type, body)
    }

    pub fn not_found() -> Self {
        Self::error(404, "Not Found")
    }

    pub fn service_unavailable() -> Self {
        Self::error(503, "Service Unavailable")
    }

    pub fn internal_error() -> Self {
        Self::error(500, "Internal Server Error")
    }

    /// Add an extra header line
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
