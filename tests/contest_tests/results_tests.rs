//! Results Tests
//!
//! Tests for ranking, disqualification and the printable report.

use litcontest::contest::{compute_results, render_report, Assignment, Review, Submission};

// =============================================================================
// Helper Functions
// =============================================================================

fn story(client: &str, id: &str, title: &str) -> Submission {
    Submission {
        client_id: client.to_string(),
        submission_id: id.to_string(),
        title: title.to_string(),
        file_name: String::new(),
        normalized_document_ref: String::new(),
        received_at_utc: 0,
    }
}

fn assigned(client: &str, ids: &[&str]) -> Assignment {
    Assignment {
        client_id: client.to_string(),
        submission_ids: ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn review(reviewer: &str, story_id: &str, score: u8) -> Review {
    Review {
        reviewer_id: reviewer.to_string(),
        story_id: story_id.to_string(),
        score,
        received_at_utc: 0,
    }
}

// =============================================================================
// Disqualification Tests
// =============================================================================

#[test]
fn test_short_reviewer_loses_own_story_but_scores_count() {
    let submissions = vec![
        story("rob", "s-r", "Rob's"),
        story("amy", "s-a", "Amy's"),
        story("bea", "s-b", "Bea's"),
        story("cal", "s-c", "Cal's"),
    ];
    let assignments = vec![
        assigned("rob", &["s-a", "s-b", "s-c"]),
        assigned("amy", &["s-r", "s-b", "s-c"]),
        assigned("bea", &["s-r", "s-a", "s-c"]),
        assigned("cal", &["s-r", "s-a", "s-b"]),
    ];
    let mut reviews = vec![review("rob", "s-a", 10)];
    for (reviewer, ids) in [
        ("amy", ["s-r", "s-b", "s-c"]),
        ("bea", ["s-r", "s-a", "s-c"]),
        ("cal", ["s-r", "s-a", "s-b"]),
    ] {
        for id in ids {
            reviews.push(review(reviewer, id, 6));
        }
    }

    let results = compute_results(&submissions, &assignments, &reviews, 3, 1000);

    assert_eq!(results.disqualified, vec!["rob"]);
    assert!(results.items.iter().all(|i| i.story_id != "s-r"));

    let amy = results.items.iter().find(|i| i.story_id == "s-a").unwrap();
    assert_eq!(amy.reviews_count, 3);
    assert!((amy.avg_score - 22.0 / 3.0).abs() < 1e-9);
    assert_eq!(results.items[0].story_id, "s-a");
}

#[test]
fn test_author_without_assignment_entry_is_not_disqualified() {
    let submissions = vec![story("amy", "s1", "One")];
    let results = compute_results(&submissions, &[], &[], 3, 0);

    assert!(results.disqualified.is_empty());
    assert_eq!(results.items.len(), 1);
    assert!(results.items[0].insufficient_reviews);
    assert_eq!(results.items[0].avg_score, 0.0);
}

#[test]
fn test_reviewer_counts_fold_case() {
    let submissions = vec![
        story("Alice", "s-a", "Alice's"),
        story("bob", "s-b", "Bob's"),
        story("carol", "s-c", "Carol's"),
    ];
    let assignments = vec![
        assigned("Alice", &["s-b", "s-c"]),
        assigned("bob", &["s-a", "s-c"]),
        assigned("carol", &["s-a", "s-b"]),
    ];
    let reviews = vec![
        review("alice", "s-b", 7),
        review("alice", "s-c", 7),
        review("bob", "s-a", 7),
        review("bob", "s-c", 7),
        review("Carol", "s-a", 7),
        review("CAROL", "s-b", 7),
    ];

    let results = compute_results(&submissions, &assignments, &reviews, 2, 0);

    assert!(results.disqualified.is_empty());
    assert_eq!(results.items.len(), 3);
}

#[test]
fn test_disqualification_reaches_differently_cased_stories() {
    let submissions = vec![story("Dan", "s-d", "Dan's"), story("eve", "s-e", "Eve's")];
    let assignments = vec![assigned("dan", &["s-e"]), assigned("eve", &["s-d"])];
    let reviews = vec![review("eve", "s-d", 5)];

    let results = compute_results(&submissions, &assignments, &reviews, 1, 0);

    assert_eq!(results.disqualified, vec!["dan"]);
    assert_eq!(results.items.len(), 1);
    assert_eq!(results.items[0].story_id, "s-e");
}

// =============================================================================
// Ranking Tests
// =============================================================================

#[test]
fn test_ranking_by_average_with_stable_ties() {
    let submissions = vec![
        story("a", "s1", "First"),
        story("b", "s2", "Second"),
        story("c", "s3", "Third"),
    ];
    let assignments = vec![
        assigned("a", &["s2", "s3"]),
        assigned("b", &["s1", "s3"]),
        assigned("c", &["s1", "s2"]),
    ];
    let reviews = vec![
        review("a", "s2", 8),
        review("a", "s3", 9),
        review("b", "s1", 8),
        review("b", "s3", 9),
        review("c", "s1", 8),
        review("c", "s2", 8),
    ];

    let results = compute_results(&submissions, &assignments, &reviews, 2, 0);
    let order: Vec<&str> = results.items.iter().map(|i| i.story_id.as_str()).collect();

    assert_eq!(order, vec!["s3", "s1", "s2"]);
    assert!(results.items.iter().all(|i| !i.insufficient_reviews));
    assert!(results.disqualified.is_empty());
}

#[test]
fn test_protocol_counters() {
    let submissions = vec![story("a", "s1", "One"), story("b", "s2", "Two")];
    let assignments = vec![assigned("b", &["s1"]), assigned("a", &["s2"])];
    let reviews = vec![review("a", "s2", 5)];

    let results = compute_results(&submissions, &assignments, &reviews, 1, 77);
    let p = &results.protocol;

    assert_eq!(results.generated_at_utc, 77);
    assert_eq!(p.total_submissions, 2);
    assert_eq!(p.total_reviewers, 2);
    assert_eq!(p.required_reviews, 1);
    assert_eq!(p.submitted_reviews, 1);
    assert_eq!(p.insufficient_stories, vec!["s1"]);
    assert_eq!(p.disqualified_authors, vec!["b"]);
    assert_eq!(results.items.len(), 1);
}

#[test]
fn test_results_json_field_names() {
    let submissions = vec![story("a", "s1", "One")];
    let results = compute_results(&submissions, &[], &[], 1, 5);
    let json = serde_json::to_value(&results).unwrap();

    assert_eq!(json["generatedAt"], 5);
    assert_eq!(json["items"][0]["storyId"], "s1");
    assert_eq!(json["items"][0]["avgScore"], 0.0);
    assert_eq!(json["items"][0]["reviewsCount"], 0);
    assert_eq!(json["items"][0]["insufficientReviews"], true);
    assert_eq!(json["protocol"]["totalSubmissions"], 1);
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_report_lists_winners_and_ranking() {
    let submissions = vec![
        story("a", "s1", "Alpha"),
        story("b", "s2", "Beta"),
        story("c", "s3", "Gamma"),
        story("d", "s4", "Delta"),
    ];
    let reviews = vec![
        review("x", "s1", 9),
        review("x", "s2", 7),
        review("y", "s2", 8),
        review("x", "s3", 5),
        review("x", "s4", 3),
    ];

    let results = compute_results(&submissions, &[], &reviews, 2, 0);
    let report = render_report(&results);

    assert!(report.contains("Prize winners (top 3):"));
    assert!(report.contains("1. Alpha [storyId=s1], avg=9.00, reviews=1 (INSUFFICIENT REVIEWS)"));
    assert!(report.contains("2. Beta [storyId=s2], avg=7.50, reviews=2\n"));
    assert!(report.contains("4. Delta [storyId=s4], avg=3.00, reviews=1 (INSUFFICIENT REVIEWS)"));

    let winners = report
        .split("Full ranking:")
        .next()
        .unwrap();
    assert!(!winners.contains("Delta"));
}
