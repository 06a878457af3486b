//! Contest records

use serde::Serialize;

/// One accepted story
///
/// Created once per intake event and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub client_id: String,
    pub submission_id: String,
    pub title: String,
    /// Name of the raw payload under the author's submissions directory
    pub file_name: String,
    /// Path of the normalized document, relative to `packs/`
    pub normalized_document_ref: String,
    /// Unix millis
    pub received_at_utc: i64,
}

/// The stories one client has to review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub client_id: String,
    pub submission_ids: Vec<String>,
}

impl Assignment {
    pub fn empty(client_id: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            submission_ids: Vec::new(),
        }
    }

    pub fn contains(&self, submission_id: &str) -> bool {
        self.submission_ids.iter().any(|id| id == submission_id)
    }
}

/// A single score given by a reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub reviewer_id: String,
    pub story_id: String,
    /// 1..=10
    pub score: u8,
    /// Unix millis
    pub received_at_utc: i64,
}

/// Lifecycle of a submission, inferred from registry membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// Payload accepted, record not yet written
    Received,
    /// In the submissions registry, no reviewer holds it yet
    Stored,
    /// Listed in at least one reviewer's assignment
    Assigned,
}

/// One ranked story
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub story_id: String,
    pub title: String,
    pub avg_score: f64,
    pub reviews_count: usize,
    pub insufficient_reviews: bool,
}

/// Aggregate counters printed with the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSummary {
    pub total_submissions: usize,
    pub total_reviewers: usize,
    pub required_reviews: usize,
    pub submitted_reviews: usize,
    pub insufficient_stories: Vec<String>,
    pub disqualified_authors: Vec<String>,
}

/// Full results snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    #[serde(rename = "generatedAt")]
    pub generated_at_utc: i64,
    pub disqualified: Vec<String>,
    pub protocol: ProtocolSummary,
    pub items: Vec<ResultItem>,
}

/// Comparison form of a client id: trimmed and lower-cased
pub fn client_key(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Client ids compare case-insensitively wherever authorship is checked
pub fn same_client(a: &str, b: &str) -> bool {
    a == b || client_key(a) == client_key(b)
}
