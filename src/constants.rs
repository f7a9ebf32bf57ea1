//! Central Configuration Constants
//!
//! Single source of truth for scoring defaults. To change default blend
//! weights, nudge weights or risk thresholds, only edit this file.

/// App name (used for default data directories)
pub const APP_NAME: &str = "collusion-core";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default blend weights for the no-model fallback, in core feature order
/// (jaccard, tfidf, ngram, paraphrase, re_rank_score). Renormalized over
/// whichever keys are present at scoring time, so they need not sum to 1.
pub const DEFAULT_BLEND_WEIGHTS: [f64; 5] = [0.18, 0.27, 0.23, 0.22, 0.06];

/// Diagnostic nudge weights. Each is capped at 0.02 so ancillary retrieval
/// signals can tilt a calibrated score but never dominate it.
pub const NUDGE_WEIGHTS: &[(&str, f64)] = &[
    ("bm25_pair", 0.02),
    ("ann_cosine", 0.015),
    ("simhash", 0.01),
    ("minhash", 0.01),
    ("cluster_same", 0.005),
];

/// Default risk thresholds (score >= threshold, checked high to low)
pub const DEFAULT_HIGH_THRESHOLD: f64 = 0.85;
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 0.70;
pub const DEFAULT_LOW_THRESHOLD: f64 = 0.50;

/// Minimum labeled rows before a training run is allowed
pub const MIN_FEEDBACK_ROWS: usize = 10;

/// Default validation fraction for training/calibration splits
pub const DEFAULT_VALIDATION_SPLIT: f64 = 0.2;

/// Default seed for deterministic splits and weight tuning
pub const DEFAULT_TRAINING_SEED: u64 = 42;

/// How often the scoring engine re-checks persisted artifacts (seconds)
pub const DEFAULT_RELOAD_INTERVAL_SECS: u64 = 5;
