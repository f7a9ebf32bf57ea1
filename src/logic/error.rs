//! Engine Error Taxonomy
//!
//! One enum for the whole core. Optional-signal absence is never an error:
//! every component defaults missing inputs to 0.0 and continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A feature vector's length disagrees with a model's expectation.
    /// Caller error: assemble at the model's declared dimensionality.
    #[error("feature vector has {got} values, model expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Training dataset too small or single-class. Training aborts and the
    /// previously active artifacts stay untouched.
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// A persisted artifact is corrupt or unreadable. The previous snapshot
    /// stays active; scoring is unaffected.
    #[error("artifact load failed: {0}")]
    ArtifactLoad(String),

    /// Malformed threshold table or weights file. Fails fast at load time,
    /// never per-request.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
