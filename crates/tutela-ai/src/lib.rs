//! Multi-signal risk classification: normalization, rule matching, semantic
//! similarity, and weighted aggregation into an actionable label.

pub mod aggregate;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod semantic;

#[cfg(feature = "onnx")]
mod embedder;
#[cfg(feature = "onnx")]
pub use embedder::OnnxEmbedder;

pub use aggregate::aggregate_risk;
pub use index::VocabularyIndex;
pub use normalize::{BasicLemmatizer, Normalizer};
pub use pipeline::Pipeline;
