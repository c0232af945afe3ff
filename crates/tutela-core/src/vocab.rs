//! The versioned detection vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Immutable snapshot of detection knowledge, fetched once per run.
///
/// `regex_patterns` is a name → pattern map; a `BTreeMap` gives the
/// deterministic iteration order that fixes rule-hit ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default)]
    pub keywords_explicit: Vec<String>,
    #[serde(default)]
    pub examples_implicit: Vec<String>,
    #[serde(default)]
    pub regex_patterns: BTreeMap<String, String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "unknown".to_string()
}

impl Vocabulary {
    /// Quick summary for logging after a fetch.
    pub fn summary(&self) -> (usize, usize, usize) {
        (
            self.keywords_explicit.len(),
            self.examples_implicit.len(),
            self.regex_patterns.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vocab_api_payload() {
        let json = r#"{
            "keywords_explicit": ["cp", "novinha"],
            "examples_implicit": ["quantos anos voce tem", "manda foto sua"],
            "regex_patterns": {"idade_menor": "\\b1[0-7]\\s*anos\\b"},
            "version": "2026-02-01"
        }"#;
        let vocab: Vocabulary = serde_json::from_str(json).unwrap();
        assert_eq!(vocab.summary(), (2, 2, 1));
        assert_eq!(vocab.version, "2026-02-01");
    }

    #[test]
    fn missing_fields_default() {
        let vocab: Vocabulary = serde_json::from_str("{}").unwrap();
        assert_eq!(vocab.summary(), (0, 0, 0));
        assert_eq!(vocab.version, "unknown");
    }
}
