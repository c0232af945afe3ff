//! Semantic similarity against the vocabulary's implicit example phrases.

use tutela_core::EmbeddingModel;

use crate::index::VocabularyIndex;

/// Maximum cosine similarity between the normalized text and the precomputed
/// example embeddings, clamped to `[0, 1]`.
///
/// Empty or whitespace-only text scores exactly `0.0` without touching the
/// model. The same holds when no model is wired in or the example set is
/// empty — the aggregator then simply sees no semantic signal.
pub fn max_similarity(
    preprocessed: &str,
    index: &VocabularyIndex,
    embedder: Option<&dyn EmbeddingModel>,
) -> anyhow::Result<f32> {
    if preprocessed.trim().is_empty() {
        return Ok(0.0);
    }
    let Some(model) = embedder else {
        return Ok(0.0);
    };
    if index.example_embeddings().is_empty() {
        return Ok(0.0);
    }

    let emb = model.embed(preprocessed)?;
    let best = index
        .example_embeddings()
        .iter()
        .map(|example| cosine_sim(&emb, example))
        .fold(f32::NEG_INFINITY, f32::max);

    Ok(best.clamp(0.0, 1.0))
}

/// Dot product of two unit-normalized vectors.
pub(crate) fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
