//! Scoring Pipeline
//!
//! predict → calibrate → nudge → classify, against one immutable snapshot.
//! Never fails for well-formed input: the result is always a finite score in
//! [0, 1] plus a risk label.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::constants::NUDGE_WEIGHTS;
use crate::logic::artifacts::snapshot::ScoringSnapshot;
use crate::logic::features::vector::SignalMap;
use crate::logic::model::weights::WeightsConfig;
use crate::logic::risk::{RiskLevel, RiskThresholds};

/// Built-in blend used when a snapshot's predictor fails mid-call
static DEFAULT_BLEND: Lazy<WeightsConfig> = Lazy::new(WeightsConfig::default);

// ============================================================================
// RESULT
// ============================================================================

/// Per-pair output: the full signal mapping for traceability, the final
/// score, and the risk label. Transient; not persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    pub signals: SignalMap,
    pub score: f64,
    pub risk: RiskLevel,
}

// ============================================================================
// DIAGNOSTIC NUDGE
// ============================================================================

/// Small additive correction from secondary retrieval/clustering signals.
/// Missing diagnostics contribute 0 rather than a renormalized share: the
/// nudge is a correction, not a primary signal, so the asymmetry with the
/// fallback blend's renormalization is deliberate.
pub fn diagnostic_nudge(calibrated: f64, signals: &SignalMap) -> f64 {
    let delta: f64 = NUDGE_WEIGHTS
        .iter()
        .filter_map(|(key, weight)| signals.get(*key).map(|value| weight * value))
        .sum();
    (calibrated + delta).clamp(0.0, 1.0)
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Score one pair against a fixed snapshot. Deterministic: the same snapshot
/// and signals always produce bit-identical output.
pub fn score_pair(
    snapshot: &ScoringSnapshot,
    thresholds: &RiskThresholds,
    signals: &SignalMap,
) -> ScoringResult {
    let raw = match snapshot.predictor.raw_score(signals) {
        Ok(p) => p,
        Err(e) => {
            // Scoring must not surface artifact trouble to the caller;
            // degrade to the built-in blend.
            log::warn!("predictor failed ({}), using default blend", e);
            DEFAULT_BLEND.blend(signals)
        }
    };
    let calibrated = snapshot.calibrator.calibrate(raw);
    let score = diagnostic_nudge(calibrated, signals);

    ScoringResult {
        signals: signals.clone(),
        score,
        risk: thresholds.classify(score),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::artifacts::snapshot::ScoringSnapshot;
    use crate::logic::features::vector::signal_map;

    fn scenario_a_signals() -> SignalMap {
        signal_map([
            ("jaccard", 0.9),
            ("tfidf", 0.95),
            ("ngram", 0.88),
            ("paraphrase", 0.92),
        ])
    }

    #[test]
    fn test_scenario_a_fallback_blend_high_risk() {
        let snapshot = ScoringSnapshot::fallback();
        let result = score_pair(&snapshot, &RiskThresholds::default(), &scenario_a_signals());
        assert!(result.score > 0.85, "score was {}", result.score);
        assert_eq!(result.risk, RiskLevel::High);
    }

    #[test]
    fn test_scenario_b_diagnostics_never_lower_score() {
        let snapshot = ScoringSnapshot::fallback();
        let thresholds = RiskThresholds::default();
        let base = score_pair(&snapshot, &thresholds, &scenario_a_signals());

        let mut with_diag = scenario_a_signals();
        with_diag.insert("bm25_pair".into(), 1.0);
        with_diag.insert("ann_cosine".into(), 1.0);
        let nudged = score_pair(&snapshot, &thresholds, &with_diag);

        assert!(nudged.score >= base.score);
        assert!(nudged.score <= 1.0);
    }

    #[test]
    fn test_nudge_clamps_at_one() {
        let signals = signal_map([
            ("bm25_pair", 1.0),
            ("ann_cosine", 1.0),
            ("simhash", 1.0),
            ("minhash", 1.0),
            ("cluster_same", 1.0),
        ]);
        assert_eq!(diagnostic_nudge(0.99, &signals), 1.0);
    }

    #[test]
    fn test_nudge_is_additive_not_renormalized() {
        // One diagnostic present contributes exactly its own weighted term;
        // absent diagnostics contribute nothing.
        let one = signal_map([("bm25_pair", 1.0)]);
        assert!((diagnostic_nudge(0.5, &one) - 0.52).abs() < 1e-12);

        let partial = signal_map([("bm25_pair", 1.0), ("cluster_same", 1.0)]);
        assert!((diagnostic_nudge(0.5, &partial) - 0.525).abs() < 1e-12);
    }

    #[test]
    fn test_nudge_table_matches_diagnostic_layout() {
        use crate::logic::features::layout::DIAGNOSTIC_KEYS;
        let nudge_keys: Vec<&str> = NUDGE_WEIGHTS.iter().map(|(k, _)| *k).collect();
        assert_eq!(nudge_keys, DIAGNOSTIC_KEYS);
        for (key, weight) in NUDGE_WEIGHTS {
            assert!(*weight <= 0.02, "{} nudge weight too large", key);
            assert!(*weight > 0.0);
        }
    }

    #[test]
    fn test_nudge_ignores_core_signals() {
        let core = scenario_a_signals();
        assert_eq!(diagnostic_nudge(0.5, &core), 0.5);
    }

    #[test]
    fn test_pipeline_idempotent() {
        let snapshot = ScoringSnapshot::fallback();
        let thresholds = RiskThresholds::default();
        let signals = signal_map([
            ("jaccard", 0.61),
            ("tfidf", 0.43),
            ("paraphrase", 0.77),
            ("bm25_pair", 0.2),
        ]);
        let a = score_pair(&snapshot, &thresholds, &signals);
        let b = score_pair(&snapshot, &thresholds, &signals);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.risk, b.risk);
    }

    #[test]
    fn test_score_always_bounded_with_garbage_input() {
        let snapshot = ScoringSnapshot::fallback();
        let thresholds = RiskThresholds::default();
        for signals in [
            SignalMap::new(),
            signal_map([("jaccard", 1e9)]),
            signal_map([("unknown_signal", -5.0)]),
            signal_map([("cluster_same", 1.0)]),
        ] {
            let result = score_pair(&snapshot, &thresholds, &signals);
            assert!(result.score.is_finite());
            assert!((0.0..=1.0).contains(&result.score));
        }
    }
}
