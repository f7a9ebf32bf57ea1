//! Fallback Weight Tuner
//!
//! Seeded random-simplex search maximizing ROC-AUC of the weighted core
//! blend over labeled feedback. The winner lands in the editable weights
//! file, so a deployment without a trained model still benefits from its
//! labels.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::logic::error::EngineError;
use crate::logic::features::layout::core_order;
use crate::logic::features::vector::assemble;
use crate::logic::feedback::record::FeedbackRecord;
use crate::logic::model::weights::WeightsConfig;

use super::metrics::roc_auc;

const DEFAULT_TRIALS: usize = 3000;

// Hand-picked starting candidates, semantic features weighted up
const SEED_CANDIDATES_5: &[[f64; 5]] = &[
    [0.15, 0.20, 0.10, 0.35, 0.20],
    [0.10, 0.15, 0.10, 0.45, 0.20],
];
const SEED_CANDIDATES_4: &[[f64; 4]] = &[
    [0.20, 0.25, 0.15, 0.40],
    [0.15, 0.20, 0.10, 0.55],
];

fn random_simplex(dim: usize, rng: &mut StdRng) -> Vec<f64> {
    let raw: Vec<f64> = (0..dim).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = raw.iter().sum();
    if total == 0.0 {
        return vec![1.0 / dim as f64; dim];
    }
    raw.into_iter().map(|v| v / total).collect()
}

fn normalized(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    weights.iter().map(|&w| w / total).collect()
}

fn eval_auc(x: &[Vec<f64>], y: &[u8], weights: &[f64]) -> f64 {
    let scores: Vec<f64> = x
        .iter()
        .map(|row| row.iter().zip(weights).map(|(v, w)| v * w).sum())
        .collect();
    roc_auc(y, &scores)
}

/// Tune blend weights on labeled feedback. Deterministic given the seed.
pub fn tune_fallback_weights(
    records: &[FeedbackRecord],
    trials: usize,
    seed: u64,
) -> Result<WeightsConfig, EngineError> {
    if records.is_empty() {
        return Err(EngineError::InsufficientData(
            "no labeled feedback rows".into(),
        ));
    }
    let y: Vec<u8> = records.iter().map(|r| r.label).collect();
    let n_pos = y.iter().filter(|&&l| l == 1).count();
    if n_pos == 0 || n_pos == y.len() {
        return Err(EngineError::InsufficientData(
            "single label class present".into(),
        ));
    }

    let dim = if records.iter().any(|r| r.has_re_rank()) { 5 } else { 4 };
    let x: Vec<Vec<f64>> = records.iter().map(|r| assemble(&r.signals, dim)).collect();

    let mut best_w = vec![1.0 / dim as f64; dim];
    let mut best_auc = eval_auc(&x, &y, &best_w);

    let seeds: Vec<Vec<f64>> = if dim == 5 {
        SEED_CANDIDATES_5.iter().map(|c| c.to_vec()).collect()
    } else {
        SEED_CANDIDATES_4.iter().map(|c| c.to_vec()).collect()
    };
    for candidate in seeds {
        let candidate = normalized(&candidate);
        let auc = eval_auc(&x, &y, &candidate);
        if auc > best_auc {
            best_auc = auc;
            best_w = candidate;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let trials = if trials == 0 { DEFAULT_TRIALS } else { trials };
    for _ in 0..trials {
        let candidate = random_simplex(dim, &mut rng);
        let auc = eval_auc(&x, &y, &candidate);
        if auc > best_auc {
            best_auc = auc;
            best_w = candidate;
        }
    }

    log::info!(
        "tuned fallback weights on {} rows (dim {}): auc {:.4}",
        y.len(),
        dim,
        best_auc
    );
    Ok(WeightsConfig {
        feature_order: core_order(dim),
        weights: best_w,
        auc: Some(best_auc),
        n_samples: Some(y.len()),
    })
}

/// Atomically replace the editable weights file
pub fn save_weights(config: &WeightsConfig, path: &Path) -> Result<(), EngineError> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(config)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
