//! Raw ingestion records and the canonical classified comment record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bucketed severity of a classified comment, ordered from benign to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ok,
    Atencao,
    Suspeito,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Atencao => "atencao",
            Self::Suspeito => "suspeito",
        }
    }

    /// Operational decision derived from the label.
    pub fn action(&self) -> Action {
        match self {
            Self::Ok => Action::Allow,
            Self::Atencao => Action::Review,
            Self::Suspeito => Action::Block,
        }
    }
}

/// What moderation should do with a comment, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Review,
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Review => "review",
            Self::Block => "block",
        }
    }
}

/// A comment as produced by an ingestion collaborator, before classification.
///
/// Only `platform`, `source_id`, `comment_id`, and `text` are required;
/// everything else defaults when the source omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawComment {
    pub platform: String,
    pub source_id: String,
    pub comment_id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "likeCount")]
    pub like_count: i64,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
}

/// Canonical unit of work: one classified comment. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub platform: String,
    pub source_id: String,
    pub comment_id: String,
    pub author: Option<String>,
    pub text: String,
    pub preprocessed: String,
    pub rule_hits: Vec<String>,
    pub semantic_score: f32,
    pub perspective_sexual: Option<f32>,
    pub final_score: f32,
    pub classification: Label,
    pub extras: Map<String, Value>,
}

impl CommentRecord {
    /// Deterministic storage identity: re-upserting the same identity
    /// overwrites rather than duplicates.
    pub fn doc_id(&self) -> String {
        format!("{}:{}:{}", self.platform, self.source_id, self.comment_id)
    }

    pub fn action(&self) -> Action {
        self.classification.action()
    }
}
