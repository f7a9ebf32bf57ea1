//! Artifact Types
//!
//! Immutable once written: a training run always writes a fresh version and
//! republishes, never mutates a persisted artifact in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::error::EngineError;
use crate::logic::features::layout::layout_hash;
use crate::logic::model::logistic::sigmoid;

// ============================================================================
// KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Platt,
    Isotonic,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Platt => "platt",
            ArtifactKind::Isotonic => "isotonic",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// MODEL ARTIFACT
// ============================================================================

/// Trained weights plus the feature order they were trained on. The layout
/// hash pins the artifact to its feature order so a reordered layout cannot
/// silently misread old weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// "logistic" or "dummy" (constant-prior fallback)
    pub model_type: String,
    pub feature_order: Vec<String>,
    pub layout_hash: u32,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub n_samples: usize,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(
        model_type: &str,
        feature_order: Vec<String>,
        weights: Vec<f64>,
        intercept: f64,
        n_samples: usize,
    ) -> Self {
        let hash = layout_hash(&feature_order);
        Self {
            model_type: model_type.to_string(),
            feature_order,
            layout_hash: hash,
            weights,
            intercept,
            n_samples,
            trained_at: Utc::now(),
        }
    }

    /// Expected core dimensionality (4 or 5)
    pub fn dim(&self) -> usize {
        self.weights.len()
    }

    /// Structural checks applied at load time
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.weights.len() != self.feature_order.len() {
            return Err(EngineError::ArtifactLoad(format!(
                "model declares {} features but carries {} weights",
                self.feature_order.len(),
                self.weights.len()
            )));
        }
        let expected = layout_hash(&self.feature_order);
        if self.layout_hash != expected {
            return Err(EngineError::ArtifactLoad(format!(
                "model layout hash {:08x} does not match feature order (expected {:08x})",
                self.layout_hash, expected
            )));
        }
        if !self.weights.iter().all(|w| w.is_finite()) || !self.intercept.is_finite() {
            return Err(EngineError::ArtifactLoad(
                "model carries non-finite coefficients".into(),
            ));
        }
        Ok(())
    }

    /// Uniform inference formula for both model types
    pub fn predict(&self, row: &[f64]) -> Result<f64, EngineError> {
        if row.len() != self.weights.len() {
            return Err(EngineError::DimensionMismatch {
                expected: self.weights.len(),
                got: row.len(),
            });
        }
        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        Ok(sigmoid(z))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::core_order;

    #[test]
    fn test_new_pins_layout_hash() {
        let artifact = ModelArtifact::new("logistic", core_order(4), vec![0.0; 4], 0.0, 10);
        artifact.validate().unwrap();
        assert_eq!(artifact.dim(), 4);
    }

    #[test]
    fn test_validate_rejects_tampered_order() {
        let mut artifact = ModelArtifact::new("logistic", core_order(4), vec![0.0; 4], 0.0, 10);
        artifact.feature_order.swap(0, 1);
        assert!(matches!(
            artifact.validate(),
            Err(EngineError::ArtifactLoad(_))
        ));
    }

    #[test]
    fn test_validate_rejects_weight_count_mismatch() {
        let artifact = ModelArtifact::new("logistic", core_order(5), vec![0.0; 4], 0.0, 10);
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let artifact = ModelArtifact::new("logistic", core_order(5), vec![0.1; 5], 0.0, 10);
        assert!(matches!(
            artifact.predict(&[0.5; 4]),
            Err(EngineError::DimensionMismatch { expected: 5, got: 4 })
        ));
    }

    #[test]
    fn test_predict_open_interval() {
        let artifact = ModelArtifact::new("logistic", core_order(4), vec![50.0; 4], 0.0, 10);
        let high = artifact.predict(&[1.0; 4]).unwrap();
        let low = artifact.predict(&[0.0; 4]).unwrap();
        assert!(high < 1.0 && high > 0.99);
        assert!((low - 0.5).abs() < 1e-12);
    }
}
