//! Final ranking
//!
//! An author whose own reviewing falls short of the requirement is
//! disqualified: their stories leave the ranking. Scores they did hand out
//! still count for the stories they reviewed.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, SecondsFormat, Utc};

use super::{client_key, Assignment, ProtocolSummary, ResultItem, Results, Review, Submission};

/// Recompute the whole results snapshot
///
/// Ranking is by descending average; equal averages keep submission order.
pub fn compute_results(
    submissions: &[Submission],
    assignments: &[Assignment],
    reviews: &[Review],
    required: usize,
    generated_at_utc: i64,
) -> Results {
    let mut by_story: HashMap<&str, Vec<u8>> = HashMap::new();
    let mut by_reviewer: HashMap<String, usize> = HashMap::new();
    for review in reviews {
        by_story
            .entry(review.story_id.as_str())
            .or_default()
            .push(review.score);
        *by_reviewer.entry(client_key(&review.reviewer_id)).or_insert(0) += 1;
    }

    // Counted and matched by client key; reported as the table spells them
    let mut disqualified_keys = HashSet::new();
    let mut disqualified: BTreeSet<&str> = BTreeSet::new();
    for assignment in assignments {
        let key = client_key(&assignment.client_id);
        if by_reviewer.get(&key).copied().unwrap_or(0) < required {
            disqualified.insert(assignment.client_id.as_str());
            disqualified_keys.insert(key);
        }
    }

    let mut items = Vec::new();
    let mut insufficient = BTreeSet::new();
    for submission in submissions {
        let scores = by_story
            .get(submission.submission_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let avg_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64
        };
        let insufficient_reviews = scores.len() < required;
        if insufficient_reviews {
            insufficient.insert(submission.submission_id.clone());
        }

        if !disqualified_keys.contains(&client_key(&submission.client_id)) {
            items.push(ResultItem {
                story_id: submission.submission_id.clone(),
                title: submission.title.clone(),
                avg_score,
                reviews_count: scores.len(),
                insufficient_reviews,
            });
        }
    }

    // sort_by is stable
    items.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));

    let disqualified: Vec<String> = disqualified.into_iter().map(str::to_string).collect();
    Results {
        generated_at_utc,
        disqualified: disqualified.clone(),
        protocol: ProtocolSummary {
            total_submissions: submissions.len(),
            total_reviewers: assignments.len(),
            required_reviews: required,
            submitted_reviews: reviews.len(),
            insufficient_stories: insufficient.into_iter().collect(),
            disqualified_authors: disqualified,
        },
        items,
    }
}

/// Human-readable protocol: counters, prize winners, full ranking
pub fn render_report(results: &Results) -> String {
    let p = &results.protocol;
    let generated = DateTime::<Utc>::from_timestamp_millis(results.generated_at_utc)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_else(|| results.generated_at_utc.to_string());

    let mut out = String::new();
    out.push_str(&format!("Protocol generated at {}\n", generated));
    out.push_str(&format!("Total submissions: {}\n", p.total_submissions));
    out.push_str(&format!("Total reviewers: {}\n", p.total_reviewers));
    out.push_str(&format!(
        "Required reviews per reviewer: {}\n",
        p.required_reviews
    ));
    out.push_str(&format!("Submitted reviews: {}\n", p.submitted_reviews));
    out.push_str(&format!(
        "Stories with insufficient reviews: [{}]\n",
        p.insufficient_stories.join(", ")
    ));
    out.push_str(&format!(
        "Disqualified authors: [{}]\n",
        p.disqualified_authors.join(", ")
    ));

    out.push_str("\nPrize winners (top 3):\n");
    for (place, item) in results.items.iter().take(3).enumerate() {
        out.push_str(&ranking_line(place + 1, item));
    }

    out.push_str("\nFull ranking:\n");
    for (place, item) in results.items.iter().enumerate() {
        out.push_str(&ranking_line(place + 1, item));
    }
    out
}

fn ranking_line(place: usize, item: &ResultItem) -> String {
    let mut line = format!(
        "{}. {} [storyId={}], avg={:.2}, reviews={}",
        place, item.title, item.story_id, item.avg_score, item.reviews_count
    );
    if item.insufficient_reviews {
        line.push_str(" (INSUFFICIENT REVIEWS)");
    }
    line.push('\n');
    line
}
