use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialize record field: {0}")]
    Serialize(#[from] serde_json::Error),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("{0}")]
    Other(String),
}
