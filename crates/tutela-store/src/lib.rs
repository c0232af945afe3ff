//! Persistence for classified comment records.
//!
//! Documents are keyed by the deterministic identity
//! `platform:source_id:comment_id`: writing the same identity again
//! overwrites, never duplicates. Records leave the store only through
//! TTL eviction or by being superseded.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::{MemoryStore, StoredDocument};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

use tutela_core::CommentRecord;

/// Writes per commit; batches larger than this span multiple commits.
pub const MAX_WRITES_PER_COMMIT: usize = 450;

/// Documents deleted per eviction round; a short round is the terminal
/// condition of the eviction loop.
pub const EVICTION_PAGE: usize = 500;

/// A store of classified comment documents.
pub trait RecordStore {
    /// Upsert records by identity, stamping `ingestedAt`. Returns the number
    /// of documents written.
    fn upsert(&mut self, records: &[CommentRecord]) -> Result<usize, StoreError>;

    /// Delete documents whose `ingestedAt` is older than `now - ttl_days`.
    /// Returns the number of documents deleted.
    fn evict_older_than(&mut self, ttl_days: i64) -> Result<usize, StoreError>;
}
