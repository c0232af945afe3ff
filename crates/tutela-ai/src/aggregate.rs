//! Weighted aggregation of rule, semantic, and toxicity signals.

use tutela_core::{Label, Thresholds};

/// Combine the detection signals into a final score and label.
///
/// A deterministic step function, not a continuous model: any rule hit
/// contributes `rule_weight`, a semantic score at or above `similarity`
/// contributes `semantic_weight`, and a toxicity score (when available)
/// contributes `perspective_sexual * perspective_weight`. Boundaries are
/// inclusive — a score exactly at `decision` is `suspeito`, and exactly at
/// `attention_ratio * decision` is `atencao`.
pub fn aggregate_risk(
    rule_hits: &[String],
    semantic_score: f32,
    thresholds: &Thresholds,
    perspective_sexual: Option<f32>,
    perspective_weight: f32,
) -> (f32, Label) {
    let rules_component = if rule_hits.is_empty() {
        0.0
    } else {
        thresholds.rule_weight
    };
    let semantic_component = if semantic_score >= thresholds.similarity {
        thresholds.semantic_weight
    } else {
        0.0
    };

    let mut final_score = rules_component + semantic_component;
    if let Some(toxicity) = perspective_sexual {
        final_score += toxicity * perspective_weight;
    }

    let label = if final_score >= thresholds.decision {
        Label::Suspeito
    } else if final_score >= thresholds.decision * thresholds.attention_ratio {
        Label::Atencao
    } else {
        Label::Ok
    };

    (final_score, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutela_core::Action;

    fn thresholds(rule_weight: f32, semantic_weight: f32, decision: f32) -> Thresholds {
        Thresholds {
            rule_weight,
            semantic_weight,
            decision,
            ..Default::default()
        }
    }

    #[test]
    fn no_signal_is_ok_allow() {
        let (score, label) = aggregate_risk(&[], 0.0, &Thresholds::default(), None, 0.4);
        assert_eq!(score, 0.0);
        assert_eq!(label, Label::Ok);
        assert_eq!(label.action(), Action::Allow);
    }

    #[test]
    fn single_rule_hit_lands_in_attention_band() {
        let th = thresholds(0.6, 0.0, 0.9);
        let hits = vec!["KW:novinha".to_string()];
        let (score, label) = aggregate_risk(&hits, 0.0, &th, None, 0.4);
        assert!((score - 0.6).abs() < 1e-6);
        // 0.6 >= 0.54 (= 0.6 * 0.9) but below 0.9
        assert_eq!(label, Label::Atencao);
        assert_eq!(label.action(), Action::Review);
    }

    #[test]
    fn score_exactly_at_decision_is_suspeito() {
        let th = thresholds(0.9, 0.0, 0.9);
        let hits = vec!["KW:x".to_string()];
        let (score, label) = aggregate_risk(&hits, 0.0, &th, None, 0.4);
        assert_eq!(score, 0.9);
        assert_eq!(label, Label::Suspeito);
    }

    #[test]
    fn score_exactly_at_attention_boundary_is_atencao() {
        // decision 1.0, attention starts at 0.6
        let th = thresholds(0.6, 0.0, 1.0);
        let hits = vec!["KW:x".to_string()];
        let (_, label) = aggregate_risk(&hits, 0.0, &th, None, 0.4);
        assert_eq!(label, Label::Atencao);
    }

    #[test]
    fn semantic_contributes_only_at_or_above_similarity() {
        let mut th = thresholds(0.0, 0.7, 0.9);
        th.similarity = 0.55;

        let (below, _) = aggregate_risk(&[], 0.54, &th, None, 0.4);
        assert_eq!(below, 0.0);

        let (at, _) = aggregate_risk(&[], 0.55, &th, None, 0.4);
        assert!((at - 0.7).abs() < 1e-6);
    }

    #[test]
    fn toxicity_is_weighted_and_additive() {
        let th = thresholds(0.6, 0.0, 0.9);
        let hits = vec!["KW:x".to_string()];
        let (score, label) = aggregate_risk(&hits, 0.0, &th, Some(0.9), 0.4);
        // 0.6 + 0.9 * 0.4 = 0.96 >= 0.9
        assert!((score - 0.96).abs() < 1e-6);
        assert_eq!(label, Label::Suspeito);
    }

    #[test]
    fn missing_toxicity_contributes_nothing() {
        let th = thresholds(0.6, 0.0, 0.9);
        let hits = vec!["KW:x".to_string()];
        let (with_none, _) = aggregate_risk(&hits, 0.0, &th, None, 0.4);
        assert!((with_none - 0.6).abs() < 1e-6);
    }
}
