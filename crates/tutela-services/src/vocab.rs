//! Client for the vocabulary API.
//!
//! A fetch failure is fatal for the run: nothing can be classified without
//! detection rules. The vocabulary is slow-changing, so callers fetch once
//! and keep the snapshot for the process lifetime.

use async_trait::async_trait;
use tracing::info;

use tutela_core::{Vocabulary, VocabularyProvider};

use crate::{ServiceError, http_client};

/// HTTP client for `GET {base}/v1/vocab`.
pub struct VocabClient {
    client: reqwest::Client,
    base_url: String,
}

impl VocabClient {
    /// `base_url` should be like `http://localhost:8001` (no trailing slash).
    pub fn new(base_url: String) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_vocab(&self) -> Result<Vocabulary, ServiceError> {
        let url = format!("{}/v1/vocab", self.base_url);
        info!(url = %url, "fetching vocabulary");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let vocab: Vocabulary = resp.json().await?;
        let (keywords, examples, patterns) = vocab.summary();
        info!(version = %vocab.version, keywords, examples, patterns, "fetched vocabulary");
        Ok(vocab)
    }
}

#[async_trait]
impl VocabularyProvider for VocabClient {
    async fn fetch(&self) -> anyhow::Result<Vocabulary> {
        Ok(self.fetch_vocab().await?)
    }
}
