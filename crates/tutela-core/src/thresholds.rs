//! Scoring thresholds: the sole tuning surface of the aggregator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("decision threshold must be > 0, got {0}")]
    NonPositiveDecision(f32),

    #[error("unrecognized threshold key: {0}")]
    UnknownThreshold(String),
}

/// Weights and cutoffs for the risk aggregator, all in `[0, ~2]`.
///
/// `escalation_weight` and `attention_ratio` are the hard-coded policy
/// constants of the original design, kept configurable but defaulting to the
/// compatible values (0.95 and 0.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Weight contributed when any rule hit is present.
    pub rule_weight: f32,
    /// Weight contributed when similarity clears `similarity`.
    pub semantic_weight: f32,
    /// Minimum cosine similarity to count as a semantic hit.
    pub similarity: f32,
    /// Score at or above which content is `suspeito`.
    pub decision: f32,
    /// Override applied to `rule_weight` when two or more rules hit.
    pub escalation_weight: f32,
    /// `atencao` starts at `attention_ratio * decision`.
    pub attention_ratio: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rule_weight: 0.9,
            semantic_weight: 0.0,
            similarity: 0.55,
            decision: 0.9,
            escalation_weight: 0.95,
            attention_ratio: 0.6,
        }
    }
}

impl Thresholds {
    /// Merge a plain key → value override map over these thresholds.
    ///
    /// Unknown keys are rejected so that a typo in configuration does not
    /// silently run with defaults.
    pub fn merged(&self, overrides: &HashMap<String, f32>) -> Result<Self, ConfigError> {
        let mut out = *self;
        for (key, &value) in overrides {
            match key.as_str() {
                "rule_weight" => out.rule_weight = value,
                "semantic_weight" => out.semantic_weight = value,
                "similarity" => out.similarity = value,
                "decision" => out.decision = value,
                "escalation_weight" => out.escalation_weight = value,
                "attention_ratio" => out.attention_ratio = value,
                _ => return Err(ConfigError::UnknownThreshold(key.clone())),
            }
        }
        out.validate()?;
        Ok(out)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision <= 0.0 {
            return Err(ConfigError::NonPositiveDecision(self.decision));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_policy() {
        let th = Thresholds::default();
        assert_eq!(th.rule_weight, 0.9);
        assert_eq!(th.semantic_weight, 0.0);
        assert_eq!(th.similarity, 0.55);
        assert_eq!(th.decision, 0.9);
        assert_eq!(th.escalation_weight, 0.95);
        assert_eq!(th.attention_ratio, 0.6);
    }

    #[test]
    fn merged_overrides_known_keys() {
        let mut overrides = HashMap::new();
        overrides.insert("rule_weight".to_string(), 0.6);
        overrides.insert("decision".to_string(), 1.2);
        let th = Thresholds::default().merged(&overrides).unwrap();
        assert_eq!(th.rule_weight, 0.6);
        assert_eq!(th.decision, 1.2);
        // untouched keys keep defaults
        assert_eq!(th.similarity, 0.55);
    }

    #[test]
    fn merged_rejects_unknown_key() {
        let mut overrides = HashMap::new();
        overrides.insert("rule_wieght".to_string(), 0.6);
        let err = Thresholds::default().merged(&overrides).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownThreshold(_)));
    }

    #[test]
    fn zero_decision_is_invalid() {
        let mut overrides = HashMap::new();
        overrides.insert("decision".to_string(), 0.0);
        let err = Thresholds::default().merged(&overrides).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveDecision(_)));
    }
}
