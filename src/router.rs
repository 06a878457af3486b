//! Request Router
//!
//! Static `(method, exact path) -> handler` table, filled once at startup.
//! There is no prefix or wildcard matching.

use std::collections::HashMap;

use crate::error::ApiError;
use crate::protocol::{Request, Response};

/// A request handler
pub type Handler = Box<dyn Fn(&Request) -> Result<Response, ApiError> + Send + Sync>;

/// Method-keyed route table
#[derive(Default)]
pub struct Router {
    routes: HashMap<String, HashMap<String, Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `path`; a second registration replaces the first
    pub fn route<F>(mut self, method: &str, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, ApiError> + Send + Sync + 'static,
    {
        self.routes
            .entry(method.to_ascii_uppercase())
            .or_default()
            .insert(path.to_string(), Box::new(handler));
        self
    }

    pub fn get<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, ApiError> + Send + Sync + 'static,
    {
        self.route("GET", path, handler)
    }

    pub fn post<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, ApiError> + Send + Sync + 'static,
    {
        self.route("POST", path, handler)
    }

    pub fn put<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, ApiError> + Send + Sync + 'static,
    {
        self.route("PUT", path, handler)
    }

    /// Handler for an exact method and path
    pub fn resolve(&self, method: &str, path: &str) -> Option<&Handler> {
        self.routes.get(method).and_then(|table| table.get(path))
    }

    /// Run the matching handler and turn its outcome into a response
    ///
    /// Unknown routes get 404. Handler errors become `{"error": ...}` with the
    /// error's status; internal details are only logged.
    pub fn dispatch(&self, request: &Request) -> Response {
        let handler = match self.resolve(request.method(), request.path()) {
            Some(handler) => handler,
            None => {
                tracing::debug!("No route for {} {}", request.method(), request.path());
                return Response::not_found();
            }
        };

        match handler(request) {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    ApiError::Internal(inner) => {
                        tracing::error!("{} {} failed: {}", request.method(), request.path(), inner)
                    }
                    other => tracing::warn!(
                        "{} {} rejected ({}): {}",
                        request.method(),
                        request.path(),
                        other.status(),
                        other
                    ),
                }
                Response::error(e.status(), &e.public_message())
            }
        }
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
