//! Keyword and regex matching against original and normalized text.

use crate::index::VocabularyIndex;

/// Apply the vocabulary's rules to one comment.
///
/// Each keyword is checked case-insensitively as a substring of both the
/// original and the normalized text and emits `KW:<keyword>` at most once.
/// Each compiled pattern is searched against both variants and emits
/// `REGEX:<name>` at most once. Hits keep vocabulary iteration order,
/// keywords first. No hits is a common, valid result.
pub fn apply_rules(original: &str, preprocessed: &str, index: &VocabularyIndex) -> Vec<String> {
    let mut hits = Vec::new();
    let haystacks = [original.to_lowercase(), preprocessed.to_lowercase()];

    for kw in &index.vocabulary().keywords_explicit {
        let needle = kw.to_lowercase();
        if haystacks.iter().any(|h| h.contains(&needle)) {
            hits.push(format!("KW:{kw}"));
        }
    }

    for (name, re) in index.regexes() {
        if re.is_match(original) || re.is_match(preprocessed) {
            hits.push(format!("REGEX:{name}"));
        }
    }

    hits
}
