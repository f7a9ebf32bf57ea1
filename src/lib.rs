//! Collusion Scoring Core
//!
//! Turns a per-pair vector of independently computed similarity signals into
//! a calibrated collusion-risk probability and a discrete risk label, and
//! refits the underlying model from accumulated reviewer feedback.
//!
//! ## Architecture
//! - `logic/features/` - Signal map → fixed-order feature vector
//! - `logic/model/` - Logistic trainer, predictor (trained vs fallback blend)
//! - `logic/calibration/` - Platt / Isotonic probability correction
//! - `logic/risk/` - Threshold table → risk label
//! - `logic/scoring/` - Full per-pair pipeline
//! - `logic/artifacts/` - Versioned artifact store + hot-reloadable snapshot
//! - `logic/feedback/` - Labeled pair records (append-only)
//! - `logic/training/` - Offline orchestrator, metrics, weight tuner

pub mod constants;
pub mod logic;

// Re-export the surface most callers need
pub use logic::artifacts::snapshot::{EngineConfig, EngineStatus, ScoringEngine};
pub use logic::error::EngineError;
pub use logic::features::vector::SignalMap;
pub use logic::risk::{RiskLevel, RiskThresholds};
pub use logic::scoring::ScoringResult;
