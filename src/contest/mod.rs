//! Contest Module
//!
//! The contest's business rules as plain functions over records. Nothing in
//! here touches the filesystem or takes a lock; [`crate::engine::ContestEngine`]
//! loads the registry, calls these, and persists what they return.
//!
//! ## Pieces
//! - `model`:      Submission / Assignment / Review records and derived results
//! - `assignment`: deterministic greedy reviewer scheduling
//! - `reviews`:    CSV parsing and all-or-nothing batch validation
//! - `results`:    ranking, disqualification and the printable report
//! - `intake`:     payload kinds and story length rules

mod model;
mod assignment;
mod reviews;
mod results;
mod intake;

pub use model::{
    client_key, same_client, Assignment, ProtocolSummary, ResultItem, Results, Review, Submission,
    SubmissionState,
};
pub use assignment::{needs_regeneration, schedule};
pub use reviews::{parse_review_csv, validate_reviews, ReviewBatch, ReviewLine, ReviewOutcome, ReviewRules};
pub use results::{compute_results, render_report};
pub use intake::{check_length, safe_name, strip_extension, PayloadKind};
