//! Registry Module
//!
//! Flat-file persistence for the contest.
//!
//! ## Layout
//! ```text
//! {data_dir}/
//!   registry/submissions.csv     clientId|submissionId|title|fileName|normalizedRef|receivedAt
//!   registry/assignments.csv     clientId|id1,id2,...
//!   registry/reviews_index.csv   reviewerId|storyId|score|receivedAt
//!   results/final.json           results snapshot
//!   results/protocol.txt         printable ranking
//!   submissions/<client>/...     raw payloads
//!   packs/normalized/<id>.docx   normalized documents
//!   reviews/<reviewer>.csv       last accepted batch per reviewer
//! ```
//!
//! Every mutation loads the whole file, changes it in memory and rewrites it
//! through a temporary file and a rename, so a reader sees either the old or
//! the new contents. The store does no locking of its own; its owner must
//! serialize access.

mod codec;
mod store;

pub use codec::{
    decode_assignments, decode_reviews, decode_submissions, encode_assignments,
    encode_reviews, encode_submissions, sanitize_field, FIELD_SEPARATOR,
};
pub use store::RegistryStore;
