//! Core types shared across the Tutela moderation pipeline.

pub mod config;
pub mod provider;
pub mod record;
pub mod thresholds;
pub mod vocab;

pub use config::Settings;
pub use provider::{EmbeddingModel, Lemmatizer, ToxicitySignal, VocabularyProvider};
pub use record::{Action, CommentRecord, Label, RawComment};
pub use thresholds::{ConfigError, Thresholds};
pub use vocab::Vocabulary;
