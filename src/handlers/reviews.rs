//! `PUT /reviews`

use serde_json::json;

use crate::engine::ContestEngine;
use crate::error::ApiError;
use crate::protocol::{Request, Response};

use super::{require_client, require_content_type};

/// Messages included in a rejection body
const ERROR_SAMPLE: usize = 5;

/// CSV of `storyId,score` lines, accepted or rejected as a whole
///
/// 201 when every line is valid, otherwise 422 with the error count and a
/// sample of the messages.
pub fn put_reviews(engine: &ContestEngine, request: &Request) -> Result<Response, ApiError> {
    let client_id = require_client(request)?;
    if !engine.windows().is_review_open(engine.now()) {
        return Err(ApiError::WindowClosed("review window closed".to_string()));
    }
    require_content_type(request, "text/csv")?;

    let csv = request.body_text();
    if csv.trim().is_empty() {
        return Err(ApiError::Validation("CSV is empty".to_string()));
    }

    let outcome = engine.accept_review_csv(&client_id, &csv)?;
    if outcome.is_accepted() {
        return Ok(Response::json(
            201,
            &json!({
                "status": "accepted",
                "clientId": client_id,
                "saved": outcome.saved,
                "errors": 0,
                "errorsSample": Vec::<String>::new(),
            }),
        ));
    }

    Ok(Response::json(
        422,
        &json!({
            "status": "rejected",
            "error": "review batch rejected",
            "clientId": client_id,
            "saved": 0,
            "errors": outcome.errors.len(),
            "errorsSample": error_sample(&outcome.errors, ERROR_SAMPLE),
        }),
    ))
}

/// First `max` messages, plus `... +K more` when some were left out
pub fn error_sample(errors: &[String], max: usize) -> Vec<String> {
    let mut sample: Vec<String> = errors.iter().take(max).cloned().collect();
    if errors.len() > max {
        sample.push(format!("... +{} more", errors.len() - max));
    }
    sample
}
