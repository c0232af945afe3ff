//! External HTTP collaborators for the moderation pipeline.

pub mod perspective;
pub mod vocab;

pub use perspective::PerspectiveClient;
pub use vocab::VocabClient;

use std::time::Duration;

use thiserror::Error;

/// Request timeout applied to every external call. The original design left
/// this unbounded; 10 seconds keeps a stuck collaborator from stalling a run.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

pub(crate) fn http_client() -> Result<reqwest::Client, ServiceError> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}
