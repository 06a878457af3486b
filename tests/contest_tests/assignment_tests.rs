//! Assignment Scheduling Tests
//!
//! These tests verify:
//! - No reviewer is ever assigned their own story
//! - No reviewer gets the same story twice
//! - Load spread stays within one in the exact-balance case
//! - The same submissions always produce the same table
//! - Small populations assign what they can
//! - Staleness detection

use std::collections::HashMap;

use litcontest::contest::{needs_regeneration, same_client, schedule, Assignment, Submission};
use litcontest::registry::encode_assignments;

// =============================================================================
// Helper Functions
// =============================================================================

fn story(client: &str, id: &str) -> Submission {
    Submission {
        client_id: client.to_string(),
        submission_id: id.to_string(),
        title: format!("Story {}", id),
        file_name: format!("story-{}.txt", id),
        normalized_document_ref: String::new(),
        received_at_utc: 0,
    }
}

fn assert_no_self_review(table: &[Assignment], submissions: &[Submission]) {
    let authors: HashMap<&str, &str> = submissions
        .iter()
        .map(|s| (s.submission_id.as_str(), s.client_id.as_str()))
        .collect();
    for entry in table {
        for id in &entry.submission_ids {
            assert!(
                !same_client(authors[id.as_str()], &entry.client_id),
                "{} was assigned own story {}",
                entry.client_id,
                id
            );
        }
    }
}

fn assert_no_duplicates(table: &[Assignment]) {
    for entry in table {
        let mut ids = entry.submission_ids.clone();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), entry.submission_ids.len(), "duplicate for {}", entry.client_id);
    }
}

fn spread(table: &[Assignment]) -> usize {
    let loads: Vec<usize> = table.iter().map(|a| a.submission_ids.len()).collect();
    loads.iter().max().unwrap() - loads.iter().min().unwrap()
}

fn reviewers_of(table: &[Assignment], id: &str) -> usize {
    table.iter().filter(|a| a.contains(id)).count()
}

fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

// =============================================================================
// Invariant Tests
// =============================================================================

#[test]
fn test_four_distinct_authors_two_reviews() {
    let submissions = vec![story("A", "s1"), story("B", "s2"), story("C", "s3"), story("D", "s4")];
    let table = schedule(&submissions, 2);

    assert_eq!(table.len(), 4);
    assert_no_self_review(&table, &submissions);
    assert_no_duplicates(&table);
    for s in &submissions {
        assert_eq!(reviewers_of(&table, &s.submission_id), 2);
    }
    assert!(spread(&table) <= 1);
}

#[test]
fn test_fairness_for_every_author_order() {
    let ids = ["s1", "s2", "s3", "s4"];
    for authors in permutations(&["A", "B", "C", "D"]) {
        let submissions: Vec<Submission> = authors
            .iter()
            .zip(ids.iter())
            .map(|(author, id)| story(author, id))
            .collect();
        let table = schedule(&submissions, 2);

        assert_no_self_review(&table, &submissions);
        assert_no_duplicates(&table);
        assert!(spread(&table) <= 1, "authors {:?} gave {:?}", authors, table);
    }
}

#[test]
fn test_larger_populations_stay_balanced() {
    for authors in 3..=9 {
        for required in 1..authors {
            let submissions: Vec<Submission> = (0..authors)
                .map(|i| story(&format!("client-{}", i), &format!("id-{:02}", authors - 1 - i)))
                .collect();
            let table = schedule(&submissions, required);

            assert_no_self_review(&table, &submissions);
            assert_no_duplicates(&table);
            assert!(spread(&table) <= 1, "{} authors, {} required", authors, required);
            for s in &submissions {
                assert_eq!(reviewers_of(&table, &s.submission_id), required);
            }
        }
    }
}

#[test]
fn test_author_with_several_stories() {
    let submissions = vec![
        story("alice", "a1"),
        story("alice", "a2"),
        story("bob", "b1"),
        story("carol", "c1"),
        story("dave", "d1"),
    ];
    let table = schedule(&submissions, 2);

    assert_no_self_review(&table, &submissions);
    assert_no_duplicates(&table);
    for s in &submissions {
        assert_eq!(reviewers_of(&table, &s.submission_id), 2);
    }
}

#[test]
fn test_case_insensitive_author_match() {
    let submissions = vec![story("Alice", "s1"), story("bob", "s2"), story("carol", "s3")];
    let table = schedule(&submissions, 2);

    let alice = table.iter().find(|a| a.client_id == "Alice").unwrap();
    assert!(!alice.contains("s1"));
}

#[test]
fn test_ids_differing_in_case_are_one_reviewer() {
    let submissions = vec![story("alice", "s1"), story("Alice", "s2"), story("bob", "s3")];
    let table = schedule(&submissions, 1);

    assert_eq!(table.len(), 2);
    let alice = table.iter().find(|a| a.client_id == "Alice").unwrap();
    assert_eq!(alice.submission_ids, vec!["s3"]);
    assert_no_self_review(&table, &submissions);
    assert!(!needs_regeneration(&table, &submissions, 1));
}

// =============================================================================
// Determinism Tests
// =============================================================================

#[test]
fn test_regeneration_is_byte_identical() {
    let submissions = vec![story("A", "s3"), story("B", "s1"), story("C", "s2"), story("D", "s4")];

    let first = encode_assignments(&schedule(&submissions, 2));
    let second = encode_assignments(&schedule(&submissions, 2));
    assert_eq!(first, second);
}

#[test]
fn test_input_order_does_not_matter() {
    let mut submissions = vec![story("A", "s3"), story("B", "s1"), story("C", "s2"), story("D", "s4")];
    let first = schedule(&submissions, 2);

    submissions.reverse();
    assert_eq!(schedule(&submissions, 2), first);
}

#[test]
fn test_table_sorted_by_client() {
    let submissions = vec![story("dave", "s1"), story("bob", "s2"), story("carol", "s3")];
    let table = schedule(&submissions, 1);
    let clients: Vec<&str> = table.iter().map(|a| a.client_id.as_str()).collect();
    assert_eq!(clients, vec!["bob", "carol", "dave"]);
}

// =============================================================================
// Small Population Tests
// =============================================================================

#[test]
fn test_single_author_gets_empty_list() {
    let submissions = vec![story("solo", "s1"), story("solo", "s2")];
    let table = schedule(&submissions, 3);

    assert_eq!(table, vec![Assignment::empty("solo")]);
}

#[test]
fn test_too_few_reviewers_assigns_what_it_can() {
    let submissions = vec![story("A", "s1"), story("B", "s2")];
    let table = schedule(&submissions, 3);

    assert_no_self_review(&table, &submissions);
    assert_eq!(reviewers_of(&table, "s1"), 1);
    assert_eq!(reviewers_of(&table, "s2"), 1);
}

#[test]
fn test_no_submissions_no_table() {
    assert!(schedule(&[], 3).is_empty());
}

// =============================================================================
// Staleness Tests
// =============================================================================

#[test]
fn test_fresh_table_is_not_stale() {
    let submissions = vec![story("A", "s1"), story("B", "s2"), story("C", "s3"), story("D", "s4")];
    let table = schedule(&submissions, 2);
    assert!(!needs_regeneration(&table, &submissions, 2));
}

#[test]
fn test_new_author_makes_table_stale() {
    let mut submissions = vec![story("A", "s1"), story("B", "s2"), story("C", "s3")];
    let table = schedule(&submissions, 2);

    submissions.push(story("D", "s4"));
    assert!(needs_regeneration(&table, &submissions, 2));
}

#[test]
fn test_unlisted_story_makes_table_stale() {
    let mut submissions = vec![story("A", "s1"), story("B", "s2"), story("C", "s3")];
    let table = schedule(&submissions, 2);

    submissions.push(story("A", "s9"));
    assert!(needs_regeneration(&table, &submissions, 2));
}

#[test]
fn test_short_list_makes_table_stale() {
    let submissions = vec![story("A", "s1"), story("B", "s2"), story("C", "s3")];
    let mut table = schedule(&submissions, 2);
    table[0].submission_ids.pop();

    assert!(needs_regeneration(&table, &submissions, 2));
}
