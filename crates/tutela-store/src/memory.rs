//! In-memory record store, used for tests and persistence-free runs.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use tutela_core::CommentRecord;

use crate::{EVICTION_PAGE, RecordStore, StoreError};

/// One persisted document: the record plus its ingestion stamp.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub record: CommentRecord,
    pub ingested_at: DateTime<Utc>,
}

/// HashMap-backed store with the same identity and eviction semantics as the
/// database-backed one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<String, StoredDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert with an explicit ingestion stamp; tests use this to backdate
    /// documents for eviction scenarios.
    pub fn upsert_at(&mut self, records: &[CommentRecord], now: DateTime<Utc>) -> usize {
        for record in records {
            self.docs.insert(
                record.doc_id(),
                StoredDocument {
                    record: record.clone(),
                    ingested_at: now,
                },
            );
        }
        records.len()
    }

    /// Delete documents ingested before `cutoff`, in bounded pages.
    pub fn evict_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let mut deleted = 0;
        loop {
            let page: Vec<String> = self
                .docs
                .iter()
                .filter(|(_, doc)| doc.ingested_at < cutoff)
                .map(|(id, _)| id.clone())
                .take(EVICTION_PAGE)
                .collect();
            if page.is_empty() {
                break;
            }
            let n = page.len();
            for id in page {
                self.docs.remove(&id);
            }
            deleted += n;
            if n < EVICTION_PAGE {
                break;
            }
        }
        deleted
    }

    pub fn get(&self, doc_id: &str) -> Option<&StoredDocument> {
        self.docs.get(doc_id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn upsert(&mut self, records: &[CommentRecord]) -> Result<usize, StoreError> {
        let written = self.upsert_at(records, Utc::now());
        info!(written, "upserted records (memory)");
        Ok(written)
    }

    fn evict_older_than(&mut self, ttl_days: i64) -> Result<usize, StoreError> {
        let cutoff = Utc::now() - Duration::days(ttl_days);
        let deleted = self.evict_before(cutoff);
        info!(deleted, ttl_days, "evicted stale records (memory)");
        Ok(deleted)
    }
}
