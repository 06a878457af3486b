//! Review Batch Tests
//!
//! Tests for CSV parsing and whole-batch validation.

use chrono::{DateTime, TimeZone, Utc};
use litcontest::contest::{
    parse_review_csv, validate_reviews, Assignment, Review, ReviewRules, Submission,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, day, 12, 0, 0).unwrap()
}

fn story(client: &str, id: &str) -> Submission {
    Submission {
        client_id: client.to_string(),
        submission_id: id.to_string(),
        title: id.to_uppercase(),
        file_name: String::new(),
        normalized_document_ref: String::new(),
        received_at_utc: 0,
    }
}

fn review(story_id: &str, score: u8, day: u32) -> Review {
    Review {
        reviewer_id: "rita".to_string(),
        story_id: story_id.to_string(),
        score,
        received_at_utc: at(day).timestamp_millis(),
    }
}

struct Fixture {
    submissions: Vec<Submission>,
    assignment: Assignment,
    existing: Vec<Review>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            submissions: vec![
                story("rita", "r1"),
                story("ann", "a1"),
                story("ben", "b1"),
                story("cat", "c1"),
                story("dan", "d1"),
            ],
            assignment: Assignment {
                client_id: "rita".to_string(),
                submission_ids: vec!["a1".into(), "b1".into(), "c1".into()],
            },
            existing: Vec::new(),
        }
    }

    fn rules(&self) -> ReviewRules<'_> {
        ReviewRules {
            reviewer_id: "rita",
            assignment: &self.assignment,
            submissions: &self.submissions,
            existing: &self.existing,
            window_from: at(1),
            window_to: at(20),
            required: 3,
        }
    }
}

// =============================================================================
// CSV Parsing Tests
// =============================================================================

#[test]
fn test_parse_valid_lines() {
    let batch = parse_review_csv("a1,7\n b1 , 10 \nc1,1\n");

    assert!(batch.errors.is_empty());
    assert_eq!(batch.entries.len(), 3);
    assert_eq!(batch.entries[1].story_id, "b1");
    assert_eq!(batch.entries[1].score, 10);
    assert_eq!(batch.entries[1].line, 2);
}

#[test]
fn test_parse_skips_blank_lines_but_counts_them() {
    let batch = parse_review_csv("a1,7\n\n   \nb1,x\r\n");

    assert_eq!(batch.entries.len(), 1);
    assert_eq!(batch.errors, vec!["line 4: score is not integer"]);
}

#[test]
fn test_parse_line_errors() {
    let batch = parse_review_csv("a1\na1,2,3\nb1,eleven\nc1,0\nd1,11\ne1,5");

    assert_eq!(
        batch.errors,
        vec![
            "line 1: expect storyId,score",
            "line 2: expect storyId,score",
            "line 3: score is not integer",
            "line 4: score out of range 1..10",
            "line 5: score out of range 1..10",
        ]
    );
    assert_eq!(batch.entries.len(), 1);
    assert_eq!(batch.entries[0].story_id, "e1");
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_valid_batch_has_no_errors() {
    let fx = Fixture::new();
    let reviews = vec![review("a1", 8, 5), review("b1", 6, 5), review("c1", 9, 5)];

    assert!(validate_reviews(&fx.rules(), &reviews).is_empty());
}

#[test]
fn test_every_violation_is_reported() {
    let fx = Fixture::new();
    let reviews = vec![
        review("a1", 8, 5),
        review("a1", 8, 5),
        review("zz", 5, 5),
        review("d1", 5, 5),
        review("r1", 5, 5),
        review("b1", 5, 25),
    ];

    let errors = validate_reviews(&fx.rules(), &reviews);
    assert_eq!(
        errors,
        vec![
            "duplicate review in payload for story a1",
            "story zz does not exist",
            "story d1 is not assigned to rita",
            "story r1: self-review is not allowed",
            "review for story b1 is outside review window",
        ]
    );
}

#[test]
fn test_batch_below_required_size() {
    let fx = Fixture::new();
    let errors = validate_reviews(&fx.rules(), &[review("a1", 8, 5)]);
    assert_eq!(errors, vec!["need at least 3 reviews, got 1"]);
}

#[test]
fn test_already_reviewed_story() {
    let mut fx = Fixture::new();
    fx.existing.push(review("b1", 4, 3));
    fx.existing.push(Review {
        reviewer_id: "someone-else".to_string(),
        ..review("c1", 4, 3)
    });

    let reviews = vec![review("a1", 8, 5), review("b1", 6, 5), review("c1", 9, 5)];
    let errors = validate_reviews(&fx.rules(), &reviews);
    assert_eq!(errors, vec!["story b1 already reviewed by rita"]);
}

#[test]
fn test_no_assignment_is_an_error() {
    let mut fx = Fixture::new();
    fx.assignment = Assignment::empty("rita");

    let errors = validate_reviews(&fx.rules(), &[review("a1", 8, 5)]);
    assert!(errors.contains(&"no assignments for client".to_string()));
    assert!(errors.contains(&"story a1 is not assigned to rita".to_string()));
}

#[test]
fn test_window_bounds_are_inclusive() {
    let fx = Fixture::new();
    let reviews = vec![review("a1", 8, 1), review("b1", 6, 20), review("c1", 9, 10)];
    assert!(validate_reviews(&fx.rules(), &reviews).is_empty());
}

#[test]
fn test_one_bad_line_among_nine_good() {
    let mut fx = Fixture::new();
    let ids: Vec<String> = (1..=9).map(|i| format!("s{}", i)).collect();
    for id in &ids {
        fx.submissions.push(story("other", id));
    }
    fx.assignment.submission_ids = ids.clone();

    let mut csv: String = ids.iter().map(|id| format!("{},7\n", id)).collect();
    csv.push_str("s1,abc\n");
    let batch = parse_review_csv(&csv);
    assert_eq!(batch.entries.len(), 9);
    assert_eq!(batch.errors, vec!["line 10: score is not integer"]);

    let reviews: Vec<Review> = batch
        .entries
        .iter()
        .map(|e| review(&e.story_id, e.score, 5))
        .collect();
    assert!(validate_reviews(&fx.rules(), &reviews).is_empty());
}
