//! # LitContest
//!
//! A peer-reviewed writing contest server with:
//! - A hand-written request parser and response writer
//! - Bounded worker pool with 503 backpressure
//! - Deterministic, self-review-free reviewer scheduling
//! - All-or-nothing review batches and a results protocol
//! - Flat-file registry with atomic rewrites
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Listener                            │
//! │            (accept loop + bounded worker pool)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  one request per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Protocol Parser  →  Router                      │
//! │           (method, exact path) → handler                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Contest Engine                              │
//! │         (single mutual-exclusion domain)                     │
//! └──────────┬─────────────────────────────────┬────────────────┘
//!            │                                 │
//!            ▼                                 ▼
//!   ┌─────────────────┐               ┌─────────────────┐
//!   │  Contest rules  │               │ Registry Store  │
//!   │ (pure functions)│               │  (flat files)   │
//!   └─────────────────┘               └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;

pub mod protocol;
pub mod router;
pub mod network;
pub mod registry;
pub mod contest;
pub mod format;
pub mod engine;
pub mod handlers;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ApiError, ContestError, Result};
pub use config::{Config, ContestWindows};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::ContestEngine;
pub use handlers::build_router;
pub use network::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LitContest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
