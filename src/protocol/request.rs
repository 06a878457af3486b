//! Request definitions
//!
//! Represents a parsed client request.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;

/// Case-insensitive header map
///
/// Keys are stored lower-cased; inserting an existing key replaces it, so the
/// last occurrence of a duplicate header wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .insert(name.trim().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A parsed request
///
/// Immutable once built by the parser. The path is kept exactly as sent
/// (no query decoding) because routing is exact-match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    version: String,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Create a request with no headers and an empty body
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version: "HTTP/1.1".to_string(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(
        method: String,
        path: String,
        version: String,
        headers: Headers,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path,
            version,
            headers,
            body,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Non-blank `X-Client-Id`, trimmed
    pub fn client_id(&self) -> Option<&str> {
        self.header("x-client-id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Lower-cased `Content-Type`, or empty
    pub fn content_type(&self) -> String {
        self.header("content-type")
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }
}
