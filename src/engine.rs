//! Engine Module
//!
//! The contest engine that coordinates intake, scheduling, reviews and results.
//!
//! ## Responsibilities
//! - Generate submission ids and persist payloads
//! - Keep the assignment table in step with the submissions
//! - Accept or reject review batches as a whole
//! - Recompute and persist the results snapshot

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, ContestWindows};
use crate::contest::{
    check_length, compute_results, needs_regeneration, parse_review_csv, render_report,
    same_client, schedule, strip_extension, validate_reviews, Assignment, PayloadKind, Results,
    Review, ReviewOutcome, ReviewRules, Submission, SubmissionState,
};
use crate::error::Result;
use crate::format::{self, WorkbookRow};
use crate::registry::{sanitize_field, RegistryStore};

/// One file attached to a mailed submission
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub file_name: String,
    /// MIME type declared by the sender, used when the name has no known extension
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

/// What a mailed submission produced
#[derive(Debug, Clone, Default)]
pub struct MailOutcome {
    pub accepted: Vec<Submission>,
    pub errors: Vec<String>,
}

/// The contest engine
///
/// ## Concurrency Model: one mutual-exclusion domain
///
/// - Every operation that reads or writes the registry holds `store` for its
///   whole duration, so intake, regeneration, review acceptance and results
///   generation never interleave.
/// - Work that needs no registry state (text extraction, document rendering)
///   happens before the lock is taken.
pub struct ContestEngine {
    /// Engine configuration
    config: Config,

    /// Source of "now" for windows and timestamps
    clock: Arc<dyn Clock>,

    /// Registry files; the lock is the engine's critical section
    store: Mutex<RegistryStore>,
}

impl ContestEngine {
    /// Open or create an engine over `config.data_dir`
    pub fn open(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let store = RegistryStore::open(&config.data_dir)?;

        tracing::info!(
            "Contest engine opened at {} ({} reviews required)",
            config.data_dir.display(),
            config.contest.required_reviews
        );

        Ok(Self {
            config,
            clock,
            store: Mutex::new(store),
        })
    }

    /// Open with default settings, the system clock and the given data directory
    pub fn open_path(path: &std::path::Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn windows(&self) -> &ContestWindows {
        &self.config.contest
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // =========================================================================
    // Intake
    // =========================================================================

    /// Register one story
    ///
    /// The caller has already checked the payload type and length. Stores the
    /// raw bytes and a normalized document, appends the record and refreshes
    /// the assignment table, which may change every reviewer's list.
    pub fn register_submission(
        &self,
        client_id: &str,
        title: &str,
        payload: &[u8],
        kind: PayloadKind,
    ) -> Result<Submission> {
        let client_id = &stored_client_id(client_id);
        let received_at = self.clock.now();
        let submission_id = Uuid::new_v4().to_string();
        tracing::debug!(
            "Submission {} from {}: {:?}",
            submission_id,
            client_id,
            SubmissionState::Received
        );

        let text = kind.extract_text(payload)?;
        let title = sanitize_field(title.trim());
        let document = format::render_document(&title, &text)?;
        let file_name = format!("story-{}{}", submission_id, kind.extension());

        let mut store = self.store.lock();
        store.store_raw_payload(client_id, &file_name, payload)?;
        let normalized_document_ref = store.store_normalized(&submission_id, &document)?;

        let submission = Submission {
            client_id: client_id.to_string(),
            submission_id,
            title,
            file_name,
            normalized_document_ref,
            received_at_utc: received_at.timestamp_millis(),
        };
        let all = store.append_submission(submission.clone())?;
        tracing::info!(
            "Stored submission {} \"{}\" from {} ({} chars)",
            submission.submission_id,
            submission.title,
            client_id,
            text.chars().count()
        );

        self.refresh_assignments(&mut store, &all)?;
        Ok(submission)
    }

    /// Register every acceptable attachment of a mailed submission
    ///
    /// A wrong subject or a closed window rejects the whole message. Otherwise
    /// each attachment is judged on its own; the title is its file name
    /// without extension.
    pub fn ingest_mail(
        &self,
        client_id: &str,
        subject: &str,
        attachments: &[MailAttachment],
    ) -> Result<MailOutcome> {
        let client_id = &stored_client_id(client_id);
        let mut outcome = MailOutcome::default();
        let windows = &self.config.contest;

        if !subject.trim().eq_ignore_ascii_case(windows.mail_subject.trim()) {
            outcome.errors.push("invalid subject".to_string());
            return Ok(outcome);
        }
        if !windows.is_submit_open(self.clock.now()) {
            outcome.errors.push("submission window closed".to_string());
            return Ok(outcome);
        }

        for attachment in attachments {
            let name = if attachment.file_name.trim().is_empty() {
                "untitled"
            } else {
                attachment.file_name.trim()
            };

            let kind = PayloadKind::from_file_name(name).or_else(|| {
                attachment
                    .content_type
                    .as_deref()
                    .and_then(PayloadKind::from_content_type)
            });
            let kind = match kind {
                Some(kind) => kind,
                None => {
                    outcome.errors.push(format!("{}: unsupported attachment type", name));
                    continue;
                }
            };

            let text = match kind.extract_text(&attachment.content) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Unreadable attachment {} from {}: {}", name, client_id, e);
                    outcome.errors.push(format!("{}: failed to read document text", name));
                    continue;
                }
            };
            if let Err(msg) = check_length(&text, windows.min_chars, windows.max_chars) {
                outcome.errors.push(format!("{}: {}", name, msg));
                continue;
            }

            let submission =
                self.register_submission(client_id, strip_extension(name), &attachment.content, kind)?;
            outcome.accepted.push(submission);
        }

        Ok(outcome)
    }

    /// All submissions in registry order
    pub fn submissions(&self) -> Result<Vec<Submission>> {
        self.store.lock().load_submissions()
    }

    /// Where a submission is in its lifecycle; `None` if the id is unknown
    pub fn submission_state(&self, submission_id: &str) -> Result<Option<SubmissionState>> {
        let store = self.store.lock();
        let known = store
            .load_submissions()?
            .iter()
            .any(|s| s.submission_id == submission_id);
        if !known {
            return Ok(None);
        }

        let assigned = store
            .load_assignments()?
            .iter()
            .any(|a| a.contains(submission_id));
        Ok(Some(if assigned {
            SubmissionState::Assigned
        } else {
            SubmissionState::Stored
        }))
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    /// The full assignment table, refreshed first if it is stale
    pub fn assignments(&self) -> Result<Vec<Assignment>> {
        let mut store = self.store.lock();
        let submissions = store.load_submissions()?;
        self.refresh_assignments(&mut store, &submissions)
    }

    /// The stories `client_id` has to review; empty if they have none
    pub fn assignments_for(&self, client_id: &str) -> Result<Assignment> {
        let table = self.assignments()?;
        Ok(Self::entry_for(&table, &stored_client_id(client_id)))
    }

    /// Recompute the table unconditionally and persist it
    pub fn regenerate_assignments(&self) -> Result<Vec<Assignment>> {
        let mut store = self.store.lock();
        let submissions = store.load_submissions()?;
        let table = schedule(&submissions, self.config.contest.required_reviews);
        store.save_assignments(&table)?;
        tracing::info!(
            "Regenerated assignments: {} reviewers, {} submissions",
            table.len(),
            submissions.len()
        );
        Ok(table)
    }

    /// Workbook listing the caller's assigned stories
    ///
    /// Unknown ids and the caller's own stories are left out.
    pub fn assignments_workbook(&self, client_id: &str) -> Result<Vec<u8>> {
        let client_id = &stored_client_id(client_id);
        let (assignment, submissions) = self.assignment_with_submissions(client_id)?;
        let rows: Vec<WorkbookRow> = Self::reviewable(&assignment, &submissions, client_id)
            .map(|s| WorkbookRow {
                story_id: s.submission_id.clone(),
                title: s.title.clone(),
                author: s.client_id.clone(),
            })
            .collect();
        format::build_workbook(&rows)
    }

    /// Zip of the normalized documents for the caller's assigned stories
    ///
    /// Entries are `<submissionId>.docx`; stories whose document is missing
    /// are skipped.
    pub fn assignments_archive(&self, client_id: &str) -> Result<Vec<u8>> {
        let client_id = &stored_client_id(client_id);
        let mut store = self.store.lock();
        let submissions = store.load_submissions()?;
        let table = self.refresh_assignments(&mut store, &submissions)?;
        let assignment = Self::entry_for(&table, client_id);

        let mut entries = Vec::new();
        for story in Self::reviewable(&assignment, &submissions, client_id) {
            match store.read_normalized(&story.normalized_document_ref)? {
                Some(bytes) => entries.push((format!("{}.docx", story.submission_id), bytes)),
                None => tracing::warn!(
                    "No normalized document for {}, left out of archive",
                    story.submission_id
                ),
            }
        }
        drop(store);

        format::build_archive(&entries)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Accept a reviewer's batch, all or nothing
    ///
    /// On success the reviewer's earlier reviews are replaced by this batch.
    /// Violations are returned in the outcome, never as `Err`.
    pub fn accept_reviews(&self, reviewer_id: &str, reviews: Vec<Review>) -> Result<ReviewOutcome> {
        let reviewer_id = stored_client_id(reviewer_id);
        let reviews = reviews
            .into_iter()
            .map(|review| Review {
                reviewer_id: reviewer_id.clone(),
                ..review
            })
            .collect();
        self.accept_batch(&reviewer_id, reviews, Vec::new())
    }

    /// Parse a `storyId,score` upload and accept it as one batch
    ///
    /// Line errors and rule violations are reported together; any error
    /// leaves the registry untouched.
    pub fn accept_review_csv(&self, reviewer_id: &str, csv: &str) -> Result<ReviewOutcome> {
        let reviewer_id = &stored_client_id(reviewer_id);
        let batch = parse_review_csv(csv);
        let received_at = self.clock.now().timestamp_millis();
        let reviews = batch
            .entries
            .into_iter()
            .map(|line| Review {
                reviewer_id: reviewer_id.to_string(),
                story_id: line.story_id,
                score: line.score,
                received_at_utc: received_at,
            })
            .collect();
        self.accept_batch(reviewer_id, reviews, batch.errors)
    }

    /// Every live review
    pub fn reviews(&self) -> Result<Vec<Review>> {
        self.store.lock().load_reviews()
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Recompute the ranking and overwrite the stored snapshot and report
    pub fn generate_results(&self) -> Result<Results> {
        let mut store = self.store.lock();
        let submissions = store.load_submissions()?;
        let assignments = self.refresh_assignments(&mut store, &submissions)?;
        let reviews = store.load_reviews()?;

        let results = compute_results(
            &submissions,
            &assignments,
            &reviews,
            self.config.contest.required_reviews,
            self.clock.now().timestamp_millis(),
        );
        store.save_results(&results, &render_report(&results))?;

        tracing::info!(
            "Results generated: {} ranked, {} disqualified",
            results.items.len(),
            results.disqualified.len()
        );
        Ok(results)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn accept_batch(
        &self,
        reviewer_id: &str,
        reviews: Vec<Review>,
        mut errors: Vec<String>,
    ) -> Result<ReviewOutcome> {
        let windows = &self.config.contest;
        let mut store = self.store.lock();

        let submissions = store.load_submissions()?;
        let table = self.refresh_assignments(&mut store, &submissions)?;
        let assignment = Self::entry_for(&table, reviewer_id);
        let existing = store.load_reviews()?;

        let rules = ReviewRules {
            reviewer_id,
            assignment: &assignment,
            submissions: &submissions,
            existing: &existing,
            window_from: windows.review_from,
            window_to: windows.review_to,
            required: windows.required_reviews,
        };
        errors.extend(validate_reviews(&rules, &reviews));

        if !errors.is_empty() {
            tracing::warn!(
                "Rejected review batch from {}: {} error(s)",
                reviewer_id,
                errors.len()
            );
            return Ok(ReviewOutcome { saved: 0, errors });
        }

        store.replace_reviews(reviewer_id, &reviews)?;
        tracing::info!("Accepted {} review(s) from {}", reviews.len(), reviewer_id);
        Ok(ReviewOutcome {
            saved: reviews.len(),
            errors,
        })
    }

    /// Stored table, or a freshly scheduled one if it is stale
    fn refresh_assignments(
        &self,
        store: &mut RegistryStore,
        submissions: &[Submission],
    ) -> Result<Vec<Assignment>> {
        let required = self.config.contest.required_reviews;
        let current = store.load_assignments()?;
        if !needs_regeneration(&current, submissions, required) {
            return Ok(current);
        }

        let table = schedule(submissions, required);
        if table != current {
            store.save_assignments(&table)?;
            tracing::info!(
                "Regenerated assignments: {} reviewers, {} submissions",
                table.len(),
                submissions.len()
            );
        }
        Ok(table)
    }

    fn assignment_with_submissions(&self, client_id: &str) -> Result<(Assignment, Vec<Submission>)> {
        let mut store = self.store.lock();
        let submissions = store.load_submissions()?;
        let table = self.refresh_assignments(&mut store, &submissions)?;
        Ok((Self::entry_for(&table, client_id), submissions))
    }

    fn entry_for(table: &[Assignment], client_id: &str) -> Assignment {
        table
            .iter()
            .find(|a| same_client(&a.client_id, client_id))
            .cloned()
            .unwrap_or_else(|| Assignment::empty(client_id))
    }

    /// Assigned stories that exist and were not written by `client_id`
    fn reviewable<'a>(
        assignment: &'a Assignment,
        submissions: &'a [Submission],
        client_id: &'a str,
    ) -> impl Iterator<Item = &'a Submission> + 'a {
        let mut seen = HashSet::new();
        assignment.submission_ids.iter().filter_map(move |id| {
            if !seen.insert(id.as_str()) {
                return None;
            }
            submissions
                .iter()
                .find(|s| &s.submission_id == id)
                .filter(|s| !same_client(&s.client_id, client_id))
        })
    }
}

/// The form a client id is stored and compared in
///
/// Registry rows cannot carry the field separator or line breaks, so those
/// become spaces here rather than only on write. Case is kept for display and
/// folded when ids are compared.
fn stored_client_id(id: &str) -> String {
    sanitize_field(id).trim().to_string()
}
