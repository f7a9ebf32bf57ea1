//! Logic Module - Scoring & Self-Learning Engines
//!
//! - `features/` - Signal assembly (fixed-order vectors, layout hashing)
//! - `model/` - Logistic trainer + polymorphic predictor
//! - `calibration/` - Probability correction (Platt, Isotonic)
//! - `risk/` - Ordered threshold table
//! - `scoring/` - Per-pair pipeline: predict → calibrate → nudge → classify
//! - `artifacts/` - Versioned artifact store, hot-reloadable snapshot
//! - `feedback/` - Append-only labeled pair records
//! - `training/` - Offline orchestrator, metrics, fallback-weight tuner

pub mod error;
pub mod features;
pub mod model;
pub mod calibration;
pub mod risk;
pub mod scoring;
pub mod artifacts;
pub mod feedback;
pub mod training;
