//! Predictor - Polymorphic Raw Scorer
//!
//! Selected once per snapshot load, never per call: `Trained` when a model
//! artifact is active, `Blend` otherwise. Both produce a raw probability
//! before calibration.

use std::sync::Arc;

use crate::logic::artifacts::types::ModelArtifact;
use crate::logic::error::EngineError;
use crate::logic::features::vector::{assemble, SignalMap};
use crate::logic::model::weights::WeightsConfig;

#[derive(Debug, Clone)]
pub enum Predictor {
    /// Inference against the active model artifact's weights
    Trained(Arc<ModelArtifact>),
    /// Renormalized weighted sum over present core signals
    Blend(WeightsConfig),
}

impl Predictor {
    /// Raw probability for one pair. The trained variant assembles the core
    /// vector at the artifact's declared dimensionality, so a dimension
    /// mismatch cannot arise on this path; direct vector callers go through
    /// [`ModelArtifact::predict`] and get `DimensionMismatch` instead.
    pub fn raw_score(&self, signals: &SignalMap) -> Result<f64, EngineError> {
        match self {
            Predictor::Trained(model) => {
                let row = assemble(signals, model.dim());
                model.predict(&row)
            }
            Predictor::Blend(weights) => Ok(weights.blend(signals)),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, Predictor::Trained(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Predictor::Trained(_) => "trained",
            Predictor::Blend(_) => "blend",
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
