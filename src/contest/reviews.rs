//! Review batches
//!
//! A reviewer uploads all of their scores at once. The batch is checked as a
//! whole and every violation is reported; a batch with any violation is not
//! stored at all.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{same_client, Assignment, Review, Submission};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// One well-formed CSV line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLine {
    /// 1-based line number in the upload
    pub line: usize,
    pub story_id: String,
    pub score: u8,
}

/// Parsed upload: the usable lines plus every line-level error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewBatch {
    pub entries: Vec<ReviewLine>,
    pub errors: Vec<String>,
}

/// What happened to a submitted batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    /// Reviews stored; 0 whenever `errors` is non-empty
    pub saved: usize,
    pub errors: Vec<String>,
}

impl ReviewOutcome {
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Everything a batch is checked against
#[derive(Debug, Clone, Copy)]
pub struct ReviewRules<'a> {
    pub reviewer_id: &'a str,
    pub assignment: &'a Assignment,
    pub submissions: &'a [Submission],
    /// Reviews already on record, from every reviewer
    pub existing: &'a [Review],
    pub window_from: DateTime<Utc>,
    pub window_to: DateTime<Utc>,
    pub required: usize,
}

/// Parse `storyId,score` lines
///
/// Blank lines are skipped. Every other line must have exactly two fields and
/// an integer score in 1..=10.
pub fn parse_review_csv(csv: &str) -> ReviewBatch {
    let mut batch = ReviewBatch::default();

    for (idx, line) in csv.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 2 {
            batch
                .errors
                .push(format!("line {}: expect storyId,score", line_no));
            continue;
        }

        let story_id = fields[0].trim();
        let score = match fields[1].trim().parse::<i64>() {
            Ok(score) => score,
            Err(_) => {
                batch
                    .errors
                    .push(format!("line {}: score is not integer", line_no));
                continue;
            }
        };
        if score < i64::from(MIN_SCORE) || score > i64::from(MAX_SCORE) {
            batch.errors.push(format!(
                "line {}: score out of range {}..{}",
                line_no, MIN_SCORE, MAX_SCORE
            ));
            continue;
        }

        batch.entries.push(ReviewLine {
            line: line_no,
            story_id: story_id.to_string(),
            score: score as u8,
        });
    }

    batch
}

/// Check a batch against the rules, returning every violation found
pub fn validate_reviews(rules: &ReviewRules<'_>, reviews: &[Review]) -> Vec<String> {
    let mut errors = Vec::new();
    let reviewer = rules.reviewer_id;

    if rules.assignment.submission_ids.is_empty() {
        errors.push("no assignments for client".to_string());
    }

    let reviewed_before: HashSet<String> = rules
        .existing
        .iter()
        .filter(|r| same_client(&r.reviewer_id, reviewer))
        .map(|r| r.story_id.to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    for review in reviews {
        let key = review.story_id.to_lowercase();
        if !seen.insert(key.clone()) {
            errors.push(format!(
                "duplicate review in payload for story {}",
                review.story_id
            ));
        }

        let story = match rules
            .submissions
            .iter()
            .find(|s| s.submission_id == review.story_id)
        {
            Some(story) => story,
            None => {
                errors.push(format!("story {} does not exist", review.story_id));
                continue;
            }
        };

        if same_client(&story.client_id, reviewer) {
            errors.push(format!(
                "story {}: self-review is not allowed",
                review.story_id
            ));
        } else if !rules.assignment.contains(&review.story_id) {
            errors.push(format!(
                "story {} is not assigned to {}",
                review.story_id, reviewer
            ));
        }

        if reviewed_before.contains(&key) {
            errors.push(format!(
                "story {} already reviewed by {}",
                review.story_id, reviewer
            ));
        }

        let at = DateTime::<Utc>::from_timestamp_millis(review.received_at_utc);
        if at.map_or(true, |ts| ts < rules.window_from || ts > rules.window_to) {
            errors.push(format!(
                "review for story {} is outside review window",
                review.story_id
            ));
        }

        if review.score < MIN_SCORE || review.score > MAX_SCORE {
            errors.push(format!(
                "score for story {} out of range {}..{}",
                review.story_id, MIN_SCORE, MAX_SCORE
            ));
        }
    }

    if reviews.len() < rules.required {
        errors.push(format!(
            "need at least {} reviews, got {}",
            rules.required,
            reviews.len()
        ));
    }

    errors
}
