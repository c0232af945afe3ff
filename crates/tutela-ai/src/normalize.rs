//! Text normalization: cleanup, lowercasing, lemmatization, stopword removal.
//!
//! The steps run in a fixed order: strip URL-like substrings, strip
//! `@mention`/`#hashtag` tokens, lowercase and trim, lemmatize, drop
//! punctuation-only tokens and stopword lemmas, join with single spaces.
//! Normalization never fails; malformed input degrades to an empty string.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use regex::Regex;

use tutela_core::Lemmatizer;

/// Portuguese stopwords dropped after lemmatization.
const STOPWORDS_PT: &[&str] = &[
    "a", "ao", "aos", "aquela", "aquelas", "aquele", "aqueles", "aquilo", "as", "até", "com",
    "como", "da", "das", "de", "dela", "delas", "dele", "deles", "depois", "do", "dos", "e",
    "ela", "elas", "ele", "eles", "em", "entre", "era", "eram", "essa", "essas", "esse",
    "esses", "esta", "estamos", "estas", "estava", "este", "estes", "estou", "está", "estão",
    "eu", "foi", "fomos", "for", "foram", "fosse", "há", "isso", "isto", "já", "lhe", "lhes",
    "mais", "mas", "me", "mesmo", "meu", "meus", "minha", "minhas", "muito", "na", "nas",
    "nem", "no", "nos", "nossa", "nossas", "nosso", "nossos", "num", "numa", "não", "nós",
    "o", "os", "ou", "para", "pela", "pelas", "pelo", "pelos", "por", "quais", "qual",
    "quando", "que", "quem", "se", "seja", "sem", "ser", "serei", "será", "seu", "seus",
    "somos", "sou", "sua", "suas", "são", "só", "também", "te", "tem", "temos", "tenho",
    "ter", "teu", "teus", "tinha", "tu", "tua", "tuas", "tém", "têm", "um", "uma", "você",
    "vocês", "vos", "à", "às", "é",
];

/// Fallback tokenizer used when no real lemmatizer service is wired in.
///
/// Splits text into Unicode alphanumeric runs and returns each run as its
/// own lemma, which already satisfies the contract of never emitting
/// punctuation-only or whitespace-only tokens.
#[derive(Debug, Default)]
pub struct BasicLemmatizer;

impl Lemmatizer for BasicLemmatizer {
    fn lemmas(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Normalizer for raw comment text. Pure function of input text plus the
/// injected lemmatizer; compiled once and shared read-only.
pub struct Normalizer {
    url_re: Regex,
    tag_re: Regex,
    stopwords: HashSet<&'static str>,
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl Normalizer {
    pub fn new(lemmatizer: Arc<dyn Lemmatizer>) -> anyhow::Result<Self> {
        Ok(Self {
            url_re: Regex::new(r"https?://\S+").context("compile url pattern")?,
            tag_re: Regex::new(r"[@#]\w+").context("compile mention/hashtag pattern")?,
            stopwords: STOPWORDS_PT.iter().copied().collect(),
            lemmatizer,
        })
    }

    pub fn with_default_lemmatizer() -> anyhow::Result<Self> {
        Self::new(Arc::new(BasicLemmatizer))
    }

    /// Normalize raw text. Output may be empty; that is a valid result.
    pub fn normalize(&self, text: &str) -> String {
        let text = self.url_re.replace_all(text, " ");
        let text = self.tag_re.replace_all(&text, " ");
        let text = text.to_lowercase();
        let text = text.trim();

        let lemmas = self.lemmatizer.lemmas(text);
        let kept: Vec<String> = lemmas
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && l.chars().any(char::is_alphanumeric))
            .filter(|l| !self.stopwords.contains(l.as_str()))
            .collect();

        kept.join(" ")
    }
}
