//! Registry Store
//!
//! Owns every file under the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::contest::{safe_name, Assignment, Results, Review, Submission};
use crate::error::{ContestError, Result};

use super::codec::{
    decode_assignments, decode_reviews, decode_submissions, encode_assignments,
    encode_reviews, encode_submissions,
};

/// File-backed registry of submissions, assignments and reviews
///
/// ## Concurrency:
/// - No internal locking; every method that writes takes `&mut self` so the
///   owner's lock is the only way in.
#[derive(Debug)]
pub struct RegistryStore {
    root: PathBuf,
}

impl RegistryStore {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const SUBMISSIONS_FILE: &'static str = "registry/submissions.csv";
    const ASSIGNMENTS_FILE: &'static str = "registry/assignments.csv";
    const REVIEWS_FILE: &'static str = "registry/reviews_index.csv";
    const RESULTS_FILE: &'static str = "results/final.json";
    const PROTOCOL_FILE: &'static str = "results/protocol.txt";
    const RAW_DIR: &'static str = "submissions";
    const PACKS_DIR: &'static str = "packs";
    const REVIEWS_DIR: &'static str = "reviews";

    /// Open or create a registry rooted at `root`
    ///
    /// Creates the directory tree and empty registry files when missing.
    pub fn open(root: &Path) -> Result<Self> {
        for dir in ["registry", "results", Self::RAW_DIR, Self::REVIEWS_DIR, "packs/normalized"] {
            fs::create_dir_all(root.join(dir))?;
        }

        let store = Self {
            root: root.to_path_buf(),
        };
        for file in [
            Self::SUBMISSIONS_FILE,
            Self::ASSIGNMENTS_FILE,
            Self::REVIEWS_FILE,
        ] {
            let path = store.root.join(file);
            if !path.exists() {
                fs::write(&path, "")?;
            }
        }
        Ok(store)
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    pub fn load_submissions(&self) -> Result<Vec<Submission>> {
        Ok(decode_submissions(&self.read_registry(Self::SUBMISSIONS_FILE)?))
    }

    pub fn save_submissions(&mut self, submissions: &[Submission]) -> Result<()> {
        self.write_atomic(Self::SUBMISSIONS_FILE, encode_submissions(submissions).as_bytes())
    }

    /// Add one record and rewrite the file; returns the new full list
    pub fn append_submission(&mut self, submission: Submission) -> Result<Vec<Submission>> {
        let mut all = self.load_submissions()?;
        all.push(submission);
        self.save_submissions(&all)?;
        Ok(all)
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    pub fn load_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(decode_assignments(&self.read_registry(Self::ASSIGNMENTS_FILE)?))
    }

    pub fn save_assignments(&mut self, assignments: &[Assignment]) -> Result<()> {
        self.write_atomic(Self::ASSIGNMENTS_FILE, encode_assignments(assignments).as_bytes())
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub fn load_reviews(&self) -> Result<Vec<Review>> {
        Ok(decode_reviews(&self.read_registry(Self::REVIEWS_FILE)?))
    }

    pub fn save_reviews(&mut self, reviews: &[Review]) -> Result<()> {
        self.write_atomic(Self::REVIEWS_FILE, encode_reviews(reviews).as_bytes())
    }

    /// Replace everything `reviewer_id` submitted before with `batch`
    ///
    /// Reviews by other reviewers are kept in their original order.
    pub fn replace_reviews(&mut self, reviewer_id: &str, batch: &[Review]) -> Result<()> {
        let mut kept: Vec<Review> = self
            .load_reviews()?
            .into_iter()
            .filter(|r| !crate::contest::same_client(&r.reviewer_id, reviewer_id))
            .collect();
        kept.extend_from_slice(batch);
        self.save_reviews(&kept)?;

        let lines: String = batch
            .iter()
            .map(|r| format!("{},{}\n", r.story_id, r.score))
            .collect();
        let archive = format!("{}/{}.csv", Self::REVIEWS_DIR, safe_name(reviewer_id));
        self.write_atomic(&archive, lines.as_bytes())
    }

    // =========================================================================
    // Payloads and documents
    // =========================================================================

    /// Keep the raw upload under the author's directory
    pub fn store_raw_payload(
        &mut self,
        client_id: &str,
        file_name: &str,
        payload: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.root.join(Self::RAW_DIR).join(safe_name(client_id));
        fs::create_dir_all(&dir)?;
        let path = dir.join(safe_name(file_name));
        fs::write(&path, payload)?;
        Ok(path)
    }

    /// Store a normalized document; returns its ref relative to `packs/`
    pub fn store_normalized(&mut self, submission_id: &str, document: &[u8]) -> Result<String> {
        let reference = format!("normalized/{}.docx", safe_name(submission_id));
        let path = self.root.join(Self::PACKS_DIR).join(&reference);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, document)?;
        Ok(reference)
    }

    /// Normalized document bytes, or `None` if the file is gone
    pub fn read_normalized(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        if reference.is_empty() || reference.contains("..") {
            return Ok(None);
        }
        let path = self.root.join(Self::PACKS_DIR).join(reference);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Overwrite the results snapshot and the printable protocol
    pub fn save_results(&mut self, results: &Results, report: &str) -> Result<()> {
        let json = serde_json::to_vec_pretty(results)?;
        self.write_atomic(Self::RESULTS_FILE, &json)?;
        self.write_atomic(Self::PROTOCOL_FILE, report.as_bytes())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn results_path(&self) -> PathBuf {
        self.root.join(Self::RESULTS_FILE)
    }

    pub fn protocol_path(&self) -> PathBuf {
        self.root.join(Self::PROTOCOL_FILE)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Registry file contents; a missing file reads as empty
    fn read_registry(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ContestError::Storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Write to `<file>.tmp`, then rename over the target
    fn write_atomic(&mut self, relative: &str, bytes: &[u8]) -> Result<()> {
        let path = self.root.join(relative);
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
