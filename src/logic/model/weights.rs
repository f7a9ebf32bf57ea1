//! Fallback Blend Weights
//!
//! Externally editable weight mapping used when no trained model is active.
//! Same JSON shape as the tuner's output, so a tuned file drops in directly:
//!
//! ```json
//! { "feature_order": ["jaccard", "tfidf", "ngram", "paraphrase"],
//!   "weights": [0.18, 0.27, 0.23, 0.22],
//!   "auc": 0.93, "n_samples": 120 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BLEND_WEIGHTS;
use crate::logic::error::EngineError;
use crate::logic::features::layout::{is_core_feature, CORE_FEATURE_ORDER};
use crate::logic::features::vector::SignalMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    pub feature_order: Vec<String>,
    pub weights: Vec<f64>,
    /// ROC-AUC on the feedback the tuner saw, if this file was tuned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_samples: Option<usize>,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            feature_order: CORE_FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
            weights: DEFAULT_BLEND_WEIGHTS.to_vec(),
            auc: None,
            n_samples: None,
        }
    }
}

impl WeightsConfig {
    /// Load and validate an editable weights file. Fails fast on malformed
    /// content; never consulted per-request.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let data = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&data).map_err(|e| {
            EngineError::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.feature_order.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "weights config declares no features".into(),
            ));
        }
        if self.feature_order.len() != self.weights.len() {
            return Err(EngineError::InvalidConfiguration(format!(
                "feature_order has {} names but {} weights",
                self.feature_order.len(),
                self.weights.len()
            )));
        }
        for (name, &w) in self.feature_order.iter().zip(&self.weights) {
            if !is_core_feature(name) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "unknown blend feature '{}'",
                    name
                )));
            }
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::InvalidConfiguration(format!(
                    "weight for '{}' must be finite and non-negative, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }

    /// Weighted sum over whichever declared features are present in the
    /// signal map, renormalized by the weight mass of the present keys so
    /// that missing optional signals do not bias the score toward zero.
    /// Clamped to [0, 1].
    pub fn blend(&self, signals: &SignalMap) -> f64 {
        let mut total = 0.0;
        let mut acc = 0.0;
        for (name, &w) in self.feature_order.iter().zip(&self.weights) {
            if let Some(&value) = signals.get(name) {
                total += w;
                acc += w * value;
            }
        }
        if total <= 0.0 {
            return 0.0;
        }
        (acc / total).clamp(0.0, 1.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::vector::signal_map;

    #[test]
    fn test_default_weights_valid() {
        WeightsConfig::default().validate().unwrap();
    }

    #[test]
    fn test_blend_renormalizes_over_present_keys() {
        let config = WeightsConfig::default();
        // Only two of five keys present: their weights renormalize to 1.0,
        // so two strong signals still yield a strong score.
        let signals = signal_map([("jaccard", 0.8), ("tfidf", 0.8)]);
        assert!((config.blend(&signals) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_blend_empty_signals() {
        let config = WeightsConfig::default();
        assert_eq!(config.blend(&SignalMap::new()), 0.0);
    }

    #[test]
    fn test_blend_monotonic_in_each_core_feature() {
        let config = WeightsConfig::default();
        let base = signal_map([
            ("jaccard", 0.4),
            ("tfidf", 0.4),
            ("ngram", 0.4),
            ("paraphrase", 0.4),
            ("re_rank_score", 0.4),
        ]);
        let before = config.blend(&base);
        for name in ["jaccard", "tfidf", "ngram", "paraphrase", "re_rank_score"] {
            let mut raised = base.clone();
            raised.insert(name.to_string(), 0.9);
            assert!(
                config.blend(&raised) >= before,
                "raising {} decreased the blend",
                name
            );
        }
    }

    #[test]
    fn test_blend_ignores_diagnostics() {
        let config = WeightsConfig::default();
        let core_only = signal_map([("jaccard", 0.6), ("tfidf", 0.6)]);
        let mut with_diag = core_only.clone();
        with_diag.insert("bm25_pair".into(), 1.0);
        assert_eq!(config.blend(&core_only), config.blend(&with_diag));
    }

    #[test]
    fn test_blend_clamped() {
        let config = WeightsConfig::default();
        let signals = signal_map([("jaccard", 5.0)]);
        assert_eq!(config.blend(&signals), 1.0);
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let config = WeightsConfig {
            feature_order: vec!["jaccard".into()],
            weights: vec![-0.1],
            auc: None,
            n_samples: None,
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let config = WeightsConfig {
            feature_order: vec!["bm25_pair".into()],
            weights: vec![0.5],
            auc: None,
            n_samples: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let config = WeightsConfig {
            feature_order: vec!["jaccard".into(), "tfidf".into()],
            weights: vec![0.5],
            auc: None,
            n_samples: None,
        };
        assert!(config.validate().is_err());
    }
}
