//! Line formats for the registry files
//!
//! One record per line, fields separated by `|`. Free-text fields have the
//! separator and line breaks replaced by spaces before writing; there is no
//! escaping or quoting.

use crate::contest::{Assignment, Review, Submission};

pub const FIELD_SEPARATOR: char = '|';

const ID_SEPARATOR: char = ',';

/// Make a value safe for a single field
pub fn sanitize_field(value: &str) -> String {
    value.replace(|c: char| c == FIELD_SEPARATOR || c == '\n' || c == '\r', " ")
}

// =============================================================================
// Submissions
// =============================================================================

pub fn encode_submissions(submissions: &[Submission]) -> String {
    let mut out = String::new();
    for s in submissions {
        let fields = [
            sanitize_field(&s.client_id),
            sanitize_field(&s.submission_id),
            sanitize_field(&s.title),
            sanitize_field(&s.file_name),
            sanitize_field(&s.normalized_document_ref),
            s.received_at_utc.to_string(),
        ];
        out.push_str(&fields.join("|"));
        out.push('\n');
    }
    out
}

/// Decode submission rows
///
/// Five-field rows written before normalized documents existed load with an
/// empty document ref; shorter rows are skipped.
pub fn decode_submissions(content: &str) -> Vec<Submission> {
    let mut submissions = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let p: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let submission = match p.len() {
            n if n >= 6 => Submission {
                client_id: p[0].to_string(),
                submission_id: p[1].to_string(),
                title: p[2].to_string(),
                file_name: p[3].to_string(),
                normalized_document_ref: p[4].to_string(),
                received_at_utc: parse_millis(p[5]),
            },
            5 => Submission {
                client_id: p[0].to_string(),
                submission_id: p[1].to_string(),
                title: p[2].to_string(),
                file_name: p[3].to_string(),
                normalized_document_ref: String::new(),
                received_at_utc: parse_millis(p[4]),
            },
            _ => {
                tracing::warn!("Skipping malformed submission row: {:?}", line);
                continue;
            }
        };
        submissions.push(submission);
    }
    submissions
}

// =============================================================================
// Assignments
// =============================================================================

pub fn encode_assignments(assignments: &[Assignment]) -> String {
    let mut out = String::new();
    for a in assignments {
        let ids: Vec<String> = a.submission_ids.iter().map(|id| sanitize_field(id)).collect();
        out.push_str(&sanitize_field(&a.client_id));
        out.push(FIELD_SEPARATOR);
        out.push_str(&ids.join(","));
        out.push('\n');
    }
    out
}

pub fn decode_assignments(content: &str) -> Vec<Assignment> {
    let mut assignments = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let Some((client, ids)) = line.split_once(FIELD_SEPARATOR) else {
            tracing::warn!("Skipping malformed assignment row: {:?}", line);
            continue;
        };
        let submission_ids = if ids.trim().is_empty() {
            Vec::new()
        } else {
            ids.split(ID_SEPARATOR).map(str::to_string).collect()
        };
        assignments.push(Assignment {
            client_id: client.to_string(),
            submission_ids,
        });
    }
    assignments
}

// =============================================================================
// Reviews
// =============================================================================

pub fn encode_reviews(reviews: &[Review]) -> String {
    let mut out = String::new();
    for r in reviews {
        out.push_str(&format!(
            "{}|{}|{}|{}\n",
            sanitize_field(&r.reviewer_id),
            sanitize_field(&r.story_id),
            r.score,
            r.received_at_utc
        ));
    }
    out
}

pub fn decode_reviews(content: &str) -> Vec<Review> {
    let mut reviews = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let p: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let score = p.get(2).and_then(|s| s.trim().parse::<u8>().ok());
        match (p.len() >= 4, score) {
            (true, Some(score)) => reviews.push(Review {
                reviewer_id: p[0].to_string(),
                story_id: p[1].to_string(),
                score,
                received_at_utc: parse_millis(p[3]),
            }),
            _ => tracing::warn!("Skipping malformed review row: {:?}", line),
        }
    }
    reviews
}

fn parse_millis(s: &str) -> i64 {
    s.trim().parse().unwrap_or(0)
}
