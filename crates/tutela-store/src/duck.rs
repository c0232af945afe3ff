//! DuckDB-backed record store, in-memory or file-backed persistent.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use duckdb::{Connection, params};
use tracing::info;

use tutela_core::CommentRecord;

use crate::{EVICTION_PAGE, MAX_WRITES_PER_COMMIT, RecordStore, StoreError};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const UPSERT_SQL: &str = "INSERT INTO comments (
        doc_id, platform, source_id, comment_id, author, text, preprocessed,
        rule_hits, semantic_score, perspective_sexual, final_score,
        classification, extras, ingested_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CAST(? AS TIMESTAMP))
    ON CONFLICT (doc_id) DO UPDATE SET
        platform = excluded.platform,
        source_id = excluded.source_id,
        comment_id = excluded.comment_id,
        author = excluded.author,
        text = excluded.text,
        preprocessed = excluded.preprocessed,
        rule_hits = excluded.rule_hits,
        semantic_score = excluded.semantic_score,
        perspective_sexual = excluded.perspective_sexual,
        final_score = excluded.final_score,
        classification = excluded.classification,
        extras = excluded.extras,
        ingested_at = excluded.ingested_at";

/// DuckDB store for classified comments.
///
/// `doc_id` is the primary key, so the upsert path is a plain
/// `ON CONFLICT DO UPDATE`. Writes are committed in chunks of at most
/// [`MAX_WRITES_PER_COMMIT`]; eviction deletes in pages of
/// [`EVICTION_PAGE`].
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open an in-memory database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Open or create a persistent database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS comments (
                doc_id VARCHAR PRIMARY KEY,
                platform VARCHAR NOT NULL,
                source_id VARCHAR NOT NULL,
                comment_id VARCHAR NOT NULL,
                author VARCHAR,
                text VARCHAR NOT NULL,
                preprocessed VARCHAR NOT NULL,
                rule_hits VARCHAR NOT NULL,
                semantic_score DOUBLE NOT NULL,
                perspective_sexual DOUBLE,
                final_score DOUBLE NOT NULL,
                classification VARCHAR NOT NULL,
                extras VARCHAR NOT NULL,
                ingested_at TIMESTAMP NOT NULL
            )",
        )?;
        Ok(Self { conn })
    }

    /// Upsert with an explicit ingestion stamp.
    pub fn upsert_at(
        &mut self,
        records: &[CommentRecord],
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let stamp = now.format(TS_FORMAT).to_string();
        let mut written = 0;

        for chunk in records.chunks(MAX_WRITES_PER_COMMIT) {
            self.conn.execute_batch("BEGIN TRANSACTION")?;
            match self.write_chunk(chunk, &stamp) {
                Ok(n) => {
                    self.conn.execute_batch("COMMIT")?;
                    written += n;
                }
                Err(e) => {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(e);
                }
            }
        }
        Ok(written)
    }

    fn write_chunk(&self, chunk: &[CommentRecord], stamp: &str) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare(UPSERT_SQL)?;
        for record in chunk {
            let rule_hits = serde_json::to_string(&record.rule_hits)?;
            let extras = serde_json::to_string(&record.extras)?;
            stmt.execute(params![
                record.doc_id(),
                record.platform,
                record.source_id,
                record.comment_id,
                record.author,
                record.text,
                record.preprocessed,
                rule_hits,
                record.semantic_score as f64,
                record.perspective_sexual.map(|v| v as f64),
                record.final_score as f64,
                record.classification.as_str(),
                extras,
                stamp,
            ])?;
        }
        Ok(chunk.len())
    }

    /// Delete documents ingested before `cutoff`, in bounded pages.
    pub fn evict_before(&mut self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let stamp = cutoff.format(TS_FORMAT).to_string();
        let mut deleted = 0;
        loop {
            let n = self.conn.execute(
                "DELETE FROM comments WHERE doc_id IN (
                    SELECT doc_id FROM comments
                    WHERE ingested_at < CAST(? AS TIMESTAMP)
                    LIMIT ?
                )",
                params![stamp, EVICTION_PAGE as i64],
            )?;
            deleted += n;
            if n < EVICTION_PAGE {
                break;
            }
        }
        Ok(deleted)
    }

    /// Number of stored documents.
    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT count(*) FROM comments", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Stored classification for one document, for verification.
    pub fn classification_of(&self, doc_id: &str) -> Result<String, StoreError> {
        let label: String = self.conn.query_row(
            "SELECT classification FROM comments WHERE doc_id = ?",
            params![doc_id],
            |row| row.get(0),
        )?;
        Ok(label)
    }
}

impl RecordStore for DuckStore {
    fn upsert(&mut self, records: &[CommentRecord]) -> Result<usize, StoreError> {
        let written = self.upsert_at(records, Utc::now())?;
        info!(written, "upserted records (duckdb)");
        Ok(written)
    }

    fn evict_older_than(&mut self, ttl_days: i64) -> Result<usize, StoreError> {
        let cutoff = Utc::now() - Duration::days(ttl_days);
        let deleted = self.evict_before(cutoff)?;
        info!(deleted, ttl_days, "evicted stale records (duckdb)");
        Ok(deleted)
    }
}
