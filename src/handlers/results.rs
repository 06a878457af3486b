//! `GET /results`

use crate::engine::ContestEngine;
use crate::error::ApiError;
use crate::protocol::{Request, Response};

/// Recompute and return the full snapshot once results time has passed
pub fn results(engine: &ContestEngine, _request: &Request) -> Result<Response, ApiError> {
    if !engine.windows().are_results_ready(engine.now()) {
        return Err(ApiError::WindowClosed("results are not ready yet".to_string()));
    }
    let results = engine.generate_results()?;
    Ok(Response::json(200, &results))
}
