//! `GET /assignments`, `/assignments.xlsx`, `/assignments.zip`

use serde_json::json;

use crate::engine::ContestEngine;
use crate::error::ApiError;
use crate::format::{XLSX_CONTENT_TYPE, ZIP_CONTENT_TYPE};
use crate::protocol::{Request, Response};

use super::require_client;

/// `{"clientId": .., "stories": [ids]}`
pub fn list(engine: &ContestEngine, request: &Request) -> Result<Response, ApiError> {
    let client_id = require_client(request)?;
    let assignment = engine.assignments_for(&client_id)?;
    Ok(Response::json(
        200,
        &json!({
            "clientId": client_id,
            "stories": assignment.submission_ids,
        }),
    ))
}

pub fn workbook(engine: &ContestEngine, request: &Request) -> Result<Response, ApiError> {
    let client_id = require_client(request)?;
    let bytes = engine.assignments_workbook(&client_id)?;
    Ok(Response::binary(XLSX_CONTENT_TYPE, bytes)
        .with_header("Content-Disposition", "attachment; filename=\"assignments.xlsx\""))
}

pub fn archive(engine: &ContestEngine, request: &Request) -> Result<Response, ApiError> {
    let client_id = require_client(request)?;
    let bytes = engine.assignments_archive(&client_id)?;
    Ok(Response::binary(ZIP_CONTENT_TYPE, bytes)
        .with_header("Content-Disposition", "attachment; filename=\"assignments.zip\""))
}
