//! Moderation orchestrator: sequences normalization, rules, semantic
//! scoring, escalation, and aggregation for each raw comment.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use tutela_core::{
    CommentRecord, EmbeddingModel, Lemmatizer, RawComment, Thresholds, ToxicitySignal, Vocabulary,
};

use crate::aggregate::aggregate_risk;
use crate::index::VocabularyIndex;
use crate::normalize::Normalizer;
use crate::{rules, semantic};

/// The classification pipeline for one vocabulary snapshot.
///
/// All state is read-only after construction, so a `Pipeline` can be shared
/// across tasks. [`reload`](Self::reload) swaps in a fresh vocabulary
/// (regex recompile + example re-embedding) — there is no implicit caching
/// anywhere else.
pub struct Pipeline {
    index: VocabularyIndex,
    normalizer: Normalizer,
    embedder: Option<Arc<dyn EmbeddingModel>>,
    toxicity: Option<Arc<dyn ToxicitySignal>>,
    thresholds: Thresholds,
    perspective_weight: f32,
    language: String,
}

impl Pipeline {
    /// Build a pipeline from a fetched vocabulary. Fatal on invalid
    /// thresholds or an uncompilable vocabulary pattern.
    pub fn new(
        vocabulary: Vocabulary,
        thresholds: Thresholds,
        embedder: Option<Arc<dyn EmbeddingModel>>,
    ) -> anyhow::Result<Self> {
        thresholds.validate()?;
        let index = VocabularyIndex::build(vocabulary, embedder.as_deref())?;
        Ok(Self {
            index,
            normalizer: Normalizer::with_default_lemmatizer()?,
            embedder,
            toxicity: None,
            thresholds,
            perspective_weight: 0.4,
            language: "pt".to_string(),
        })
    }

    /// Enable the external toxicity signal.
    pub fn with_toxicity(mut self, provider: Arc<dyn ToxicitySignal>, weight: f32) -> Self {
        self.toxicity = Some(provider);
        self.perspective_weight = weight;
        self
    }

    /// Replace the fallback lemmatizer with a real one.
    pub fn with_lemmatizer(mut self, lemmatizer: Arc<dyn Lemmatizer>) -> anyhow::Result<Self> {
        self.normalizer = Normalizer::new(lemmatizer)?;
        Ok(self)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn vocab_version(&self) -> &str {
        self.index.version()
    }

    /// Swap in a refreshed vocabulary. The old index stays in place if the
    /// new one fails to build.
    pub fn reload(&mut self, vocabulary: Vocabulary) -> anyhow::Result<()> {
        self.index = VocabularyIndex::build(vocabulary, self.embedder.as_deref())?;
        Ok(())
    }

    /// Classify one raw comment with the configured thresholds.
    pub async fn moderate(&self, raw: &RawComment) -> anyhow::Result<CommentRecord> {
        self.moderate_with(raw, &self.thresholds).await
    }

    /// Classify one raw comment with per-call thresholds (already merged
    /// over defaults by the caller).
    pub async fn moderate_with(
        &self,
        raw: &RawComment,
        thresholds: &Thresholds,
    ) -> anyhow::Result<CommentRecord> {
        let preprocessed = self.normalizer.normalize(&raw.text);
        let hits = rules::apply_rules(&raw.text, &preprocessed, &self.index);
        let semantic_score =
            semantic::max_similarity(&preprocessed, &self.index, self.embedder.as_deref())?;

        let perspective_sexual = match &self.toxicity {
            Some(provider) => match provider.sexually_explicit(&raw.text, &self.language).await {
                Ok(score) => Some(score),
                Err(error) => {
                    warn!(comment_id = %raw.comment_id, %error, "toxicity signal unavailable");
                    None
                }
            },
            None => None,
        };

        // Two or more independent rule matches are stronger evidence than
        // the configured default weight alone would produce.
        let mut effective = *thresholds;
        if hits.len() >= 2 && effective.rule_weight < 1.0 {
            effective.rule_weight = effective.escalation_weight;
        }

        let (final_score, classification) = aggregate_risk(
            &hits,
            semantic_score,
            &effective,
            perspective_sexual,
            self.perspective_weight,
        );

        let mut extras = Map::new();
        extras.insert("likeCount".to_string(), Value::from(raw.like_count));
        extras.insert(
            "publishedAt".to_string(),
            raw.published_at.clone().map_or(Value::Null, Value::from),
        );
        extras.insert(
            "permalink".to_string(),
            raw.permalink.clone().map_or(Value::Null, Value::from),
        );

        Ok(CommentRecord {
            platform: raw.platform.clone(),
            source_id: raw.source_id.clone(),
            comment_id: raw.comment_id.clone(),
            author: raw.author.clone(),
            text: raw.text.clone(),
            preprocessed,
            rule_hits: hits,
            semantic_score,
            perspective_sexual,
            final_score,
            classification,
            extras,
        })
    }

    /// Classify a batch. A record whose scoring fails is skipped with a
    /// warning; it never aborts the rest of the batch.
    pub async fn moderate_batch(&self, raws: &[RawComment]) -> Vec<CommentRecord> {
        let mut records = Vec::with_capacity(raws.len());
        for raw in raws {
            match self.moderate(raw).await {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!(comment_id = %raw.comment_id, %error, "skipping unscorable comment");
                }
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tutela_core::{Action, Label};

    struct FakeEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl EmbeddingModel for FakeEmbedder {
        fn dim(&self) -> usize {
            3
        }

        fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0, 0.0, 1.0]))
        }

        fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            texts.iter().map(|t| self.embed(t)).collect()
        }
    }

    struct FixedToxicity(f32);

    #[async_trait]
    impl ToxicitySignal for FixedToxicity {
        async fn sexually_explicit(&self, _text: &str, _lang: &str) -> anyhow::Result<f32> {
            Ok(self.0)
        }
    }

    struct BrokenToxicity;

    #[async_trait]
    impl ToxicitySignal for BrokenToxicity {
        async fn sexually_explicit(&self, _text: &str, _lang: &str) -> anyhow::Result<f32> {
            anyhow::bail!("perspective unreachable")
        }
    }

    fn vocab(keywords: &[&str]) -> Vocabulary {
        Vocabulary {
            keywords_explicit: keywords.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn raw(text: &str) -> RawComment {
        RawComment {
            platform: "youtube".into(),
            source_id: "vid1".into(),
            comment_id: "c1".into(),
            author: Some("anon".into()),
            text: text.into(),
            like_count: 3,
            published_at: None,
            permalink: None,
        }
    }

    fn thresholds(rule_weight: f32, decision: f32) -> Thresholds {
        Thresholds {
            rule_weight,
            semantic_weight: 0.0,
            decision,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn clean_comment_is_ok_allow() {
        let pipeline = Pipeline::new(vocab(&["novinha"]), Thresholds::default(), None).unwrap();
        let record = pipeline.moderate(&raw("adorei o video, parabens")).await.unwrap();
        assert!(record.rule_hits.is_empty());
        assert_eq!(record.final_score, 0.0);
        assert_eq!(record.classification, Label::Ok);
        assert_eq!(record.action(), Action::Allow);
    }

    #[tokio::test]
    async fn single_hit_reviews_two_hits_escalate_to_block() {
        let pipeline = Pipeline::new(
            vocab(&["novinha", "manda foto"]),
            thresholds(0.6, 0.9),
            None,
        )
        .unwrap();

        let one = pipeline.moderate(&raw("olha a novinha")).await.unwrap();
        assert_eq!(one.rule_hits.len(), 1);
        assert!((one.final_score - 0.6).abs() < 1e-6);
        assert_eq!(one.classification, Label::Atencao);
        assert_eq!(one.action(), Action::Review);

        // Two hits with rule_weight < 1.0 escalate the weight to 0.95.
        let two = pipeline.moderate(&raw("novinha, manda foto ai")).await.unwrap();
        assert_eq!(two.rule_hits.len(), 2);
        assert!((two.final_score - 0.95).abs() < 1e-6);
        assert_eq!(two.classification, Label::Suspeito);
        assert_eq!(two.action(), Action::Block);
    }

    #[tokio::test]
    async fn escalation_skipped_when_rule_weight_already_high() {
        let pipeline = Pipeline::new(
            vocab(&["novinha", "manda foto"]),
            thresholds(1.5, 0.9),
            None,
        )
        .unwrap();
        let record = pipeline.moderate(&raw("novinha, manda foto")).await.unwrap();
        assert!((record.final_score - 1.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn semantic_signal_crosses_threshold() {
        let mut vectors = HashMap::new();
        vectors.insert("quantos anos voce tem".to_string(), vec![1.0, 0.0, 0.0]);
        vectors.insert("idade".to_string(), vec![0.9, 0.1, 0.0]);
        let embedder = Arc::new(FakeEmbedder { vectors });

        let vocabulary = Vocabulary {
            examples_implicit: vec!["quantos anos voce tem".into()],
            ..Default::default()
        };
        let th = Thresholds {
            rule_weight: 0.9,
            semantic_weight: 0.7,
            similarity: 0.55,
            decision: 0.9,
            ..Default::default()
        };
        let pipeline = Pipeline::new(vocabulary, th, Some(embedder)).unwrap();

        // "que idade você tem?" normalizes to "idade" (stopwords drop).
        let record = pipeline.moderate(&raw("que idade você tem?")).await.unwrap();
        assert_eq!(record.preprocessed, "idade");
        assert!(record.semantic_score > 0.55);
        assert!((record.final_score - 0.7).abs() < 1e-6);
        assert_eq!(record.classification, Label::Atencao);
    }

    #[tokio::test]
    async fn toxicity_signal_is_added_when_available() {
        let pipeline = Pipeline::new(vocab(&["novinha"]), thresholds(0.6, 0.9), None)
            .unwrap()
            .with_toxicity(Arc::new(FixedToxicity(0.9)), 0.4);
        let record = pipeline.moderate(&raw("olha a novinha")).await.unwrap();
        assert_eq!(record.perspective_sexual, Some(0.9));
        assert!((record.final_score - 0.96).abs() < 1e-6);
        assert_eq!(record.classification, Label::Suspeito);
    }

    #[tokio::test]
    async fn toxicity_failure_never_blocks_classification() {
        let pipeline = Pipeline::new(vocab(&["novinha"]), thresholds(0.6, 0.9), None)
            .unwrap()
            .with_toxicity(Arc::new(BrokenToxicity), 0.4);
        let record = pipeline.moderate(&raw("olha a novinha")).await.unwrap();
        assert_eq!(record.perspective_sexual, None);
        assert!((record.final_score - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn reload_swaps_vocabulary() {
        let mut pipeline =
            Pipeline::new(vocab(&["antigo"]), Thresholds::default(), None).unwrap();
        let before = pipeline.moderate(&raw("termo novo aqui")).await.unwrap();
        assert!(before.rule_hits.is_empty());

        pipeline.reload(vocab(&["termo novo"])).unwrap();
        let after = pipeline.moderate(&raw("termo novo aqui")).await.unwrap();
        assert_eq!(after.rule_hits, vec!["KW:termo novo"]);
    }

    #[tokio::test]
    async fn record_carries_extras_and_identity() {
        let pipeline = Pipeline::new(vocab(&[]), Thresholds::default(), None).unwrap();
        let record = pipeline.moderate(&raw("oi")).await.unwrap();
        assert_eq!(record.doc_id(), "youtube:vid1:c1");
        assert_eq!(record.extras["likeCount"], 3);
        assert_eq!(record.extras["publishedAt"], Value::Null);
    }

    #[tokio::test]
    async fn empty_text_still_produces_a_record() {
        let pipeline = Pipeline::new(vocab(&["x"]), Thresholds::default(), None).unwrap();
        let record = pipeline.moderate(&raw("")).await.unwrap();
        assert_eq!(record.preprocessed, "");
        assert_eq!(record.semantic_score, 0.0);
        assert_eq!(record.classification, Label::Ok);
    }

    #[tokio::test]
    async fn batch_keeps_input_order() {
        let pipeline = Pipeline::new(vocab(&["novinha"]), thresholds(0.6, 0.9), None).unwrap();
        let raws = vec![raw("tudo bem"), raw("olha a novinha")];
        let records = pipeline.moderate_batch(&raws).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].classification, Label::Ok);
        assert_eq!(records[1].classification, Label::Atencao);
    }
}
