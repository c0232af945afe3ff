//! Google Perspective client for the optional SEXUALLY_EXPLICIT signal.
//!
//! Every failure mode here — transport error, non-2xx status, missing score
//! in the response — is non-fatal for classification. The orchestrator logs
//! and carries on without the signal.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use tutela_core::ToxicitySignal;

use crate::{ServiceError, http_client};

const ANALYZE_URL: &str = "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze";

/// Client for the Comment Analyzer endpoint.
pub struct PerspectiveClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    #[serde(rename = "attributeScores")]
    attribute_scores: AttributeScores,
}

#[derive(Deserialize)]
struct AttributeScores {
    #[serde(rename = "SEXUALLY_EXPLICIT")]
    sexually_explicit: AttributeScore,
}

#[derive(Deserialize)]
struct AttributeScore {
    #[serde(rename = "summaryScore")]
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f32,
}

impl PerspectiveClient {
    pub fn new(api_key: String) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client()?,
            api_key,
            url: ANALYZE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }

    pub async fn score(&self, text: &str, lang: &str) -> Result<f32, ServiceError> {
        let payload = json!({
            "comment": {"text": text},
            "languages": [lang],
            "requestedAttributes": {"SEXUALLY_EXPLICIT": {}}
        });

        let resp = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalyzeResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Shape(e.to_string()))?;
        Ok(parsed.attribute_scores.sexually_explicit.summary_score.value)
    }
}

#[async_trait]
impl ToxicitySignal for PerspectiveClient {
    async fn sexually_explicit(&self, text: &str, lang: &str) -> anyhow::Result<f32> {
        Ok(self.score(text, lang).await?)
    }
}
