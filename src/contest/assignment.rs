//! Reviewer scheduling
//!
//! Every story needs `required` distinct reviewers, none of them its author,
//! with the review load spread as evenly as a single greedy pass allows.
//!
//! ## Algorithm
//! 1. Stories are visited in submission id order.
//! 2. Every author is a reviewer and starts with load 0.
//! 3. For each story, eligible reviewers are ranked by (load, lower-cased id)
//!    as of the start of that story and taken in order.
//! 4. If slots remain, the eligible reviewers are re-ranked by their updated
//!    load and scanned once more.
//! 5. A population too small to fill every slot assigns what it can.
//! 6. While some reviewer carries two or more stories more than another, a
//!    story the lighter one may review moves over. Each move strictly lowers
//!    the sum of squared loads, so this ends.
//!
//! The same set of submissions always yields the same table.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{client_key, same_client, Assignment, Submission};

/// Compute the full assignment table, one entry per author, sorted by client id
///
/// Ids differing only in case are one author; the entry keeps the smallest
/// spelling.
pub fn schedule(submissions: &[Submission], required: usize) -> Vec<Assignment> {
    let reviewers = distinct_authors(submissions);

    let mut load: HashMap<&str, usize> = reviewers.iter().map(|r| (*r, 0)).collect();
    let mut buckets: BTreeMap<&str, Vec<String>> =
        reviewers.iter().map(|r| (*r, Vec::new())).collect();

    let mut ordered: Vec<&Submission> = submissions.iter().collect();
    ordered.sort_by(|a, b| a.submission_id.cmp(&b.submission_id));

    for target in ordered {
        let mut eligible: Vec<&str> = reviewers
            .iter()
            .copied()
            .filter(|r| !same_client(r, &target.client_id))
            .collect();
        rank(&mut eligible, &load);

        let mut assigned = 0;
        for reviewer in &eligible {
            if assigned >= required {
                break;
            }
            if assign(*reviewer, &target.submission_id, &mut buckets, &mut load) {
                assigned += 1;
            }
        }

        if assigned < required {
            rank(&mut eligible, &load);
            for reviewer in &eligible {
                if assigned >= required {
                    break;
                }
                if assign(*reviewer, &target.submission_id, &mut buckets, &mut load) {
                    assigned += 1;
                }
            }
        }

        if assigned < required {
            tracing::debug!(
                "Story {} has {} of {} reviewers (population too small)",
                target.submission_id,
                assigned,
                required
            );
        }
    }

    let authors: HashMap<&str, &str> = submissions
        .iter()
        .map(|s| (s.submission_id.as_str(), s.client_id.as_str()))
        .collect();
    while rebalance_once(&reviewers, &authors, &mut buckets, &mut load) {}

    buckets
        .into_iter()
        .map(|(client_id, submission_ids)| Assignment {
            client_id: client_id.to_string(),
            submission_ids,
        })
        .collect()
}

/// Whether the stored table is stale for the current submissions
///
/// True when the number of distinct authors differs from the number of
/// stored entries, some author's list is shorter than `required`, or a story
/// that could be reviewed sits in nobody's list.
pub fn needs_regeneration(
    current: &[Assignment],
    submissions: &[Submission],
    required: usize,
) -> bool {
    let authors = distinct_authors(submissions);
    if authors.len() != current.len() {
        return true;
    }

    if authors.len() > 1 && required > 0 {
        let listed: HashSet<&str> = current
            .iter()
            .flat_map(|a| a.submission_ids.iter().map(String::as_str))
            .collect();
        if submissions
            .iter()
            .any(|s| !listed.contains(s.submission_id.as_str()))
        {
            return true;
        }
    }

    authors.iter().any(|author| {
        current
            .iter()
            .find(|a| same_client(&a.client_id, author))
            .map_or(true, |a| a.submission_ids.len() < required)
    })
}

/// One spelling per client key, in byte order
fn distinct_authors(submissions: &[Submission]) -> Vec<&str> {
    let mut seen = HashSet::new();
    submissions
        .iter()
        .map(|s| s.client_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|id| seen.insert(client_key(id)))
        .collect()
}

/// Order by ascending load, then case-insensitive id, then exact id
fn rank(reviewers: &mut [&str], load: &HashMap<&str, usize>) {
    reviewers.sort_by(|a, b| {
        let la = load.get(a).copied().unwrap_or(0);
        let lb = load.get(b).copied().unwrap_or(0);
        la.cmp(&lb)
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            .then_with(|| a.cmp(b))
    });
}

/// Move one story from a heavier to a lighter reviewer; false if none can move
fn rebalance_once<'a>(
    reviewers: &[&'a str],
    authors: &HashMap<&str, &str>,
    buckets: &mut BTreeMap<&'a str, Vec<String>>,
    load: &mut HashMap<&'a str, usize>,
) -> bool {
    let mut light = reviewers.to_vec();
    rank(&mut light, load);
    let mut heavy = light.clone();
    heavy.sort_by(|a, b| {
        load.get(b)
            .cmp(&load.get(a))
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            .then_with(|| a.cmp(b))
    });

    for from in &heavy {
        for to in &light {
            let (lf, lt) = (load[from], load[to]);
            if lf <= lt + 1 {
                continue;
            }

            let movable = buckets[from].iter().position(|id| {
                let author = authors.get(id.as_str()).copied().unwrap_or("");
                !same_client(to, author) && !buckets[to].contains(id)
            });

            if let Some(idx) = movable {
                let id = buckets.get_mut(from).map(|b| b.remove(idx));
                if let (Some(id), Some(target)) = (id, buckets.get_mut(to)) {
                    target.push(id);
                    *load.entry(*from).or_insert(0) -= 1;
                    *load.entry(*to).or_insert(0) += 1;
                    return true;
                }
            }
        }
    }
    false
}

/// Add the story to the reviewer's list unless already there
fn assign<'a>(
    reviewer: &'a str,
    submission_id: &str,
    buckets: &mut BTreeMap<&'a str, Vec<String>>,
    load: &mut HashMap<&'a str, usize>,
) -> bool {
    let bucket = buckets.entry(reviewer).or_default();
    if bucket.iter().any(|id| id == submission_id) {
        return false;
    }
    bucket.push(submission_id.to_string());
    *load.entry(reviewer).or_insert(0) += 1;
    true
}
