//! Configuration for the contest server
//!
//! Centralized configuration with sensible defaults. Can be built in code
//! through [`ConfigBuilder`] or loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::Deserialize;

use crate::error::{ContestError, Result};

/// Main configuration for a contest server instance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── registry/        (submissions, assignments, reviews index)
    ///     ├── submissions/     (raw payloads per client)
    ///     ├── packs/normalized (normalized documents)
    ///     ├── reviews/         (accepted review batches per reviewer)
    ///     └── results/         (final.json, protocol.txt)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub workers: usize,

    /// Connections allowed to wait for a free worker before 503
    pub queue_capacity: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,

    /// Largest accepted request body (bytes)
    pub max_body_bytes: usize,

    // -------------------------------------------------------------------------
    // Contest Configuration
    // -------------------------------------------------------------------------
    pub contest: ContestWindows,
}

/// Contest calendar and thresholds
///
/// All windows are inclusive on both ends.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContestWindows {
    pub submit_from: DateTime<Utc>,
    pub submit_to: DateTime<Utc>,
    pub review_from: DateTime<Utc>,
    pub review_to: DateTime<Utc>,
    pub results_at: DateTime<Utc>,

    /// Stories must be strictly longer than this (in chars)
    pub min_chars: usize,

    /// Stories must be strictly shorter than this (in chars)
    pub max_chars: usize,

    /// Reviews each author owes, and reviewers per story
    pub required_reviews: usize,

    /// Subject line expected on mailed submissions
    pub mail_subject: String,

    /// Timezone label shown on /status
    pub timezone: String,

    /// Offset used to render instants on /status
    pub utc_offset_minutes: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./storage"),
            listen_addr: "127.0.0.1:8080".to_string(),
            workers: 32,
            queue_capacity: 200,
            read_timeout_ms: 15_000,
            write_timeout_ms: 15_000,
            max_body_bytes: 16 * 1024 * 1024, // 16 MB
            contest: ContestWindows::default(),
        }
    }
}

impl Default for ContestWindows {
    fn default() -> Self {
        Self {
            submit_from: utc(2025, 11, 1, 0, 0, 0),
            submit_to: utc(2025, 11, 10, 23, 59, 59),
            review_from: utc(2025, 10, 1, 0, 0, 0),
            review_to: utc(2025, 12, 31, 23, 59, 59),
            results_at: utc(2025, 11, 22, 12, 0, 0),
            min_chars: 2000,
            max_chars: 30000,
            required_reviews: 3,
            mail_subject: "Literature Contest Submission".to_string(),
            timezone: "Europe/Kyiv".to_string(),
            utc_offset_minutes: 120,
        }
    }
}

impl ContestWindows {
    pub fn is_submit_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.submit_from && now <= self.submit_to
    }

    pub fn is_review_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.review_from && now <= self.review_to
    }

    pub fn are_results_ready(&self, now: DateTime<Utc>) -> bool {
        now >= self.results_at
    }

    /// Fixed offset for display; falls back to UTC on an out-of-range value
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a config from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ContestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ContestError::Config("workers must be at least 1".into()));
        }
        let c = &self.contest;
        if c.submit_from > c.submit_to || c.review_from > c.review_to {
            return Err(ContestError::Config(
                "window start must not be after its end".into(),
            ));
        }
        if c.min_chars >= c.max_chars {
            return Err(ContestError::Config(
                "min_chars must be below max_chars".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set how many accepted connections may wait for a worker
    pub fn queue_capacity(mut self, count: usize) -> Self {
        self.config.queue_capacity = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Replace the whole contest calendar
    pub fn contest(mut self, windows: ContestWindows) -> Self {
        self.config.contest = windows;
        self
    }

    pub fn required_reviews(mut self, count: usize) -> Self {
        self.config.contest.required_reviews = count;
        self
    }

    /// Set the story length bounds (exclusive)
    pub fn char_limits(mut self, min: usize, max: usize) -> Self {
        self.config.contest.min_chars = min;
        self.config.contest.max_chars = max;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
