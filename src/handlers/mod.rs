//! Request Handlers
//!
//! Thin adapters between the wire and the engine. A handler checks the
//! caller's identity, the time window and the content type, then hands the
//! payload to [`ContestEngine`] and formats what comes back.
//!
//! ## Routes
//! | Method | Path                | Handler                        |
//! |--------|---------------------|--------------------------------|
//! | GET    | `/status`           | [`status::status`]             |
//! | GET    | `/assignments`      | [`assignments::list`]          |
//! | GET    | `/assignments.xlsx` | [`assignments::workbook`]      |
//! | GET    | `/assignments.zip`  | [`assignments::archive`]       |
//! | GET    | `/results`          | [`results::results`]           |
//! | POST   | `/submit`           | [`submissions::submit`]        |
//! | POST   | `/mail`             | [`submissions::mail`]          |
//! | PUT    | `/submission`       | [`submissions::put_submission`]|
//! | PUT    | `/reviews`          | [`reviews::put_reviews`]       |

pub mod status;
pub mod assignments;
pub mod results;
pub mod submissions;
pub mod reviews;

use std::sync::Arc;

use crate::engine::ContestEngine;
use crate::error::ApiError;
use crate::protocol::{Request, Response};
use crate::router::Router;

/// Router with every contest route bound to `engine`
pub fn build_router(engine: Arc<ContestEngine>) -> Router {
    let e = &engine;
    Router::new()
        .get("/status", bind(e, status::status))
        .get("/assignments", bind(e, assignments::list))
        .get("/assignments.xlsx", bind(e, assignments::workbook))
        .get("/assignments.zip", bind(e, assignments::archive))
        .get("/results", bind(e, results::results))
        .post("/submit", bind(e, submissions::submit))
        .post("/mail", bind(e, submissions::mail))
        .put("/submission", bind(e, submissions::put_submission))
        .put("/reviews", bind(e, reviews::put_reviews))
}

type EngineHandler = fn(&ContestEngine, &Request) -> Result<Response, ApiError>;

fn bind(
    engine: &Arc<ContestEngine>,
    handler: EngineHandler,
) -> impl Fn(&Request) -> Result<Response, ApiError> + Send + Sync + 'static {
    let engine = Arc::clone(engine);
    move |request: &Request| handler(&engine, request)
}

// =============================================================================
// Shared checks
// =============================================================================

/// Trimmed `X-Client-Id`, or 401
pub(crate) fn require_client(request: &Request) -> Result<String, ApiError> {
    request
        .client_id()
        .map(str::to_string)
        .ok_or(ApiError::Unauthorized)
}

/// 415 unless the media type starts with `expected`
pub(crate) fn require_content_type(request: &Request, expected: &str) -> Result<(), ApiError> {
    if request.content_type().starts_with(expected) {
        Ok(())
    } else {
        Err(ApiError::UnsupportedMediaType(format!(
            "Content-Type must be {}",
            expected
        )))
    }
}
