//! Compiled, immutable snapshot of the detection vocabulary.
//!
//! Regex patterns are compiled once (case-insensitive) and the implicit
//! example phrases are embedded once, so that per-comment scoring never pays
//! for compilation or example embedding again. A failed pattern compile is a
//! fatal configuration error.

use anyhow::Context;
use regex::{Regex, RegexBuilder};
use tracing::info;

use tutela_core::{EmbeddingModel, Vocabulary};

/// Read-only shared state for a classification run. Rebuild via
/// [`build`](Self::build) to pick up a refreshed vocabulary.
#[derive(Debug)]
pub struct VocabularyIndex {
    vocabulary: Vocabulary,
    regexes: Vec<(String, Regex)>,
    example_embeddings: Vec<Vec<f32>>,
}

impl VocabularyIndex {
    /// Compile the vocabulary and precompute example embeddings.
    ///
    /// Without an embedding model the index is still usable; the semantic
    /// scorer then always reports `0.0`.
    pub fn build(
        vocabulary: Vocabulary,
        embedder: Option<&dyn EmbeddingModel>,
    ) -> anyhow::Result<Self> {
        let mut regexes = Vec::with_capacity(vocabulary.regex_patterns.len());
        for (name, pattern) in &vocabulary.regex_patterns {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("compile vocabulary pattern '{name}'"))?;
            regexes.push((name.clone(), re));
        }

        let example_embeddings = match embedder {
            Some(model) if !vocabulary.examples_implicit.is_empty() => {
                let texts: Vec<&str> = vocabulary
                    .examples_implicit
                    .iter()
                    .map(String::as_str)
                    .collect();
                model
                    .embed_batch(&texts)
                    .context("embed vocabulary example phrases")?
            }
            _ => Vec::new(),
        };

        let (kw, ex, rx) = vocabulary.summary();
        info!(
            version = %vocabulary.version,
            keywords = kw,
            examples = ex,
            patterns = rx,
            embedded = example_embeddings.len(),
            "built vocabulary index"
        );

        Ok(Self {
            vocabulary,
            regexes,
            example_embeddings,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Compiled patterns in vocabulary iteration order.
    pub fn regexes(&self) -> &[(String, Regex)] {
        &self.regexes
    }

    /// Unit-normalized embeddings of `examples_implicit`, same order.
    pub fn example_embeddings(&self) -> &[Vec<f32>] {
        &self.example_embeddings
    }

    pub fn version(&self) -> &str {
        &self.vocabulary.version
    }
}
