//! Training Module - Offline Self-Learning
//!
//! Runs out-of-band from scoring: reads the feedback store, refits the
//! classifier and calibrators, and publishes fresh artifacts for the live
//! engine to hot-reload. Never touches the scoring path directly.

pub mod metrics;
pub mod orchestrator;
pub mod split;
pub mod tune;

pub use metrics::{pr_auc, roc_auc};
pub use orchestrator::{train, TrainingConfig, TrainingReport};
pub use tune::{save_weights, tune_fallback_weights};
