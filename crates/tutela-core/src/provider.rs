//! Injectable capability interfaces for external collaborators.
//!
//! The embedding backend, the lemmatizer, the vocabulary API, and the
//! toxicity API are all black boxes with a narrow contract. Modelling them
//! as traits keeps the orchestrator testable with fakes and gives one place
//! to hang timeout policy.

use async_trait::async_trait;

use crate::vocab::Vocabulary;

/// Sentence embedding backend producing unit-normalized vectors.
pub trait EmbeddingModel: Send + Sync {
    /// Embedding dimensionality.
    fn dim(&self) -> usize;

    /// Embed a single text, returning a unit-normalized vector.
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed a batch, one unit-normalized vector per input.
    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Tokenizer + lemmatizer for one language, consumed by the normalizer.
pub trait Lemmatizer: Send + Sync {
    /// Split already-lowercased text into lemmas. Punctuation-only and
    /// whitespace-only tokens must not appear in the output.
    fn lemmas(&self, text: &str) -> Vec<String>;
}

/// Source of the detection vocabulary. Slow-changing; fetched once per run.
#[async_trait]
pub trait VocabularyProvider: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<Vocabulary>;
}

/// Optional external toxicity signal in `[0, 1]`.
///
/// Callers must treat any error as "signal unavailable", never as a
/// classification failure.
#[async_trait]
pub trait ToxicitySignal: Send + Sync {
    async fn sexually_explicit(&self, text: &str, lang: &str) -> anyhow::Result<f32>;
}
