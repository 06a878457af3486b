//! Story intake: `POST /submit`, `POST /mail`, `PUT /submission`
//!
//! All three paths apply the same order of checks: client id (401), submit
//! window (403), media type (415), payload and length (422).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::contest::{check_length, PayloadKind, Submission};
use crate::engine::{ContestEngine, MailAttachment};
use crate::error::ApiError;
use crate::protocol::{Request, Response};

use super::{require_client, require_content_type};

const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, Deserialize)]
struct SubmitBody {
    title: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MailBody {
    subject: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    /// Base64 of the attachment bytes
    content: Option<String>,
}

/// JSON `{title, text}`
pub fn submit(engine: &ContestEngine, request: &Request) -> Result<Response, ApiError> {
    let client_id = require_client(request)?;
    require_submit_window(engine)?;
    require_content_type(request, "application/json")?;

    let body: SubmitBody = serde_json::from_slice(request.body())
        .map_err(|_| ApiError::Validation("body must be a JSON object".to_string()))?;
    let (title, text) = match (body.title, body.text) {
        (Some(title), Some(text)) if !title.trim().is_empty() && !text.trim().is_empty() => {
            (title, text)
        }
        _ => return Err(ApiError::Validation("title and text are required".to_string())),
    };
    check_story_length(engine, &text)?;

    let submission =
        engine.register_submission(&client_id, &title, text.as_bytes(), PayloadKind::PlainText)?;
    Ok(accepted(&submission))
}

/// JSON `{subject, fileName, contentType, content}` with a base64 attachment
pub fn mail(engine: &ContestEngine, request: &Request) -> Result<Response, ApiError> {
    let client_id = require_client(request)?;
    require_submit_window(engine)?;
    require_content_type(request, "application/json")?;

    let body: MailBody = serde_json::from_slice(request.body())
        .map_err(|_| ApiError::Validation("body must be a JSON object".to_string()))?;
    let content = body
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("content is required".to_string()))?;
    let content = STANDARD
        .decode(content.trim())
        .map_err(|_| ApiError::Validation("content is not valid base64".to_string()))?;

    let attachment = MailAttachment {
        file_name: body.file_name.unwrap_or_default(),
        content_type: body.content_type,
        content,
    };
    let outcome = engine.ingest_mail(
        &client_id,
        body.subject.as_deref().unwrap_or(""),
        std::slice::from_ref(&attachment),
    )?;

    if !outcome.errors.is_empty() || outcome.accepted.is_empty() {
        let error = outcome
            .errors
            .first()
            .cloned()
            .unwrap_or_else(|| "no acceptable attachment".to_string());
        return Ok(Response::json(
            422,
            &json!({
                "status": "rejected",
                "error": error,
                "errors": outcome.errors,
            }),
        ));
    }

    let ids: Vec<&str> = outcome
        .accepted
        .iter()
        .map(|s| s.submission_id.as_str())
        .collect();
    Ok(Response::json(
        201,
        &json!({
            "status": "accepted",
            "clientId": client_id,
            "submissionIds": ids,
        }),
    ))
}

/// Raw `text/plain` or document bytes; title from `X-Story-Title`
pub fn put_submission(engine: &ContestEngine, request: &Request) -> Result<Response, ApiError> {
    let client_id = require_client(request)?;
    require_submit_window(engine)?;

    if request.body().is_empty() {
        return Err(ApiError::Validation("empty body".to_string()));
    }
    let kind = PayloadKind::from_content_type(&request.content_type()).ok_or_else(|| {
        ApiError::UnsupportedMediaType("Content-Type must be text/plain or docx".to_string())
    })?;

    let text = kind
        .extract_text(request.body())
        .map_err(|_| ApiError::Validation("cannot read document text".to_string()))?;
    check_story_length(engine, &text)?;

    let title = request
        .header("x-story-title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);

    let submission = engine.register_submission(&client_id, title, request.body(), kind)?;
    Ok(Response::json(
        201,
        &json!({
            "status": "stored",
            "clientId": client_id,
            "submissionId": submission.submission_id,
            "file": submission.file_name,
        }),
    ))
}

// =============================================================================
// Helpers
// =============================================================================

fn require_submit_window(engine: &ContestEngine) -> Result<(), ApiError> {
    if engine.windows().is_submit_open(engine.now()) {
        Ok(())
    } else {
        Err(ApiError::WindowClosed("submission window closed".to_string()))
    }
}

fn check_story_length(engine: &ContestEngine, text: &str) -> Result<(), ApiError> {
    let windows = engine.windows();
    check_length(text, windows.min_chars, windows.max_chars)
        .map(|_| ())
        .map_err(ApiError::Validation)
}

fn accepted(submission: &Submission) -> Response {
    let received_at = DateTime::<Utc>::from_timestamp_millis(submission.received_at_utc)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default();
    Response::json(
        201,
        &json!({
            "status": "accepted",
            "submissionId": submission.submission_id,
            "title": submission.title,
            "receivedAt": received_at,
        }),
    )
}
