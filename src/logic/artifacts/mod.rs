//! Artifacts Module - Persistence & Hot Reload
//!
//! - `types` - versioned model/calibration artifacts
//! - `store` - filesystem store with checksums and atomic publish
//! - `snapshot` - the live (predictor, calibrator) pair and its reload loop

pub mod snapshot;
pub mod store;
pub mod types;

pub use snapshot::{EngineConfig, EngineStatus, ScoringEngine, ScoringSnapshot};
pub use store::FsArtifactStore;
pub use types::{ArtifactKind, ModelArtifact};
