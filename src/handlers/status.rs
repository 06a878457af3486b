//! `GET /status`

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::json;

use crate::engine::ContestEngine;
use crate::error::ApiError;
use crate::protocol::{Request, Response};

/// Clock, windows and their open/closed flags, in the contest's local offset
pub fn status(engine: &ContestEngine, _request: &Request) -> Result<Response, ApiError> {
    let windows = engine.windows();
    let offset = windows.offset();
    let now = engine.now();

    let body = json!({
        "serverTime": local(now, offset),
        "timezone": windows.timezone,
        "submitFrom": local(windows.submit_from, offset),
        "submitTo": local(windows.submit_to, offset),
        "reviewFrom": local(windows.review_from, offset),
        "reviewTo": local(windows.review_to, offset),
        "resultsAt": local(windows.results_at, offset),
        "isSubmitOpen": windows.is_submit_open(now),
        "isReviewOpen": windows.is_review_open(now),
        "areResultsReady": windows.are_results_ready(now),
    });
    Ok(Response::json(200, &body))
}

fn local(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}
