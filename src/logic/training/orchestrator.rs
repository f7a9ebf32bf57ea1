//! Training Orchestrator
//!
//! Batch job: feedback records in, fresh artifacts out. Scoring keeps
//! serving the previous snapshot until the new files are published; a run
//! that fails leaves everything untouched.

use serde::Serialize;

use crate::constants::{DEFAULT_TRAINING_SEED, DEFAULT_VALIDATION_SPLIT, MIN_FEEDBACK_ROWS};
use crate::logic::artifacts::store::FsArtifactStore;
use crate::logic::artifacts::types::{ArtifactKind, ModelArtifact};
use crate::logic::calibration::{IsotonicRegressor, PlattScaler};
use crate::logic::error::EngineError;
use crate::logic::features::layout::{core_order, CORE_DIM, CORE_DIM_RERANK};
use crate::logic::features::vector::assemble;
use crate::logic::feedback::record::FeedbackRecord;
use crate::logic::model::logistic::{
    DummyClassifier, LogisticRegression, TrainConfig, TrainableClassifier,
};

use super::metrics::{pr_auc, roc_auc};
use super::split::split_dataset;

// Hyperparameter grid recovered from the original trainer
const GRID_L2: &[f64] = &[1e-4, 1e-3, 3e-3, 1e-2];
const GRID_LR: &[f64] = &[0.05, 0.1, 0.2, 0.3];
const GRID_EPOCHS: usize = 2000;

// ============================================================================
// CONFIG & REPORT
// ============================================================================

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub validation_split: f64,
    pub seed: u64,
    pub min_rows: usize,
    /// Grid-search learning rate and L2 by validation AUC; a single fit with
    /// `logistic` otherwise
    pub grid_search: bool,
    pub logistic: TrainConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            validation_split: DEFAULT_VALIDATION_SPLIT,
            seed: DEFAULT_TRAINING_SEED,
            min_rows: MIN_FEEDBACK_ROWS,
            grid_search: true,
            logistic: TrainConfig::default(),
        }
    }
}

/// What a training run did, for the operator and the logs
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub n_samples: usize,
    pub n_train: usize,
    pub n_validation: usize,
    pub dim: usize,
    pub model_type: String,
    pub auc_raw: f64,
    pub pr_auc_raw: f64,
    pub auc_platt: Option<f64>,
    pub auc_isotonic: Option<f64>,
    pub model_version: String,
    pub platt_version: Option<String>,
    pub isotonic_version: Option<String>,
}

// ============================================================================
// TRAIN
// ============================================================================

/// Fit a classifier and calibrators from labeled feedback and publish them.
/// `InsufficientData` aborts before anything is written.
pub fn train(
    records: &[FeedbackRecord],
    config: &TrainingConfig,
    store: &FsArtifactStore,
) -> Result<TrainingReport, EngineError> {
    if records.len() < config.min_rows {
        return Err(EngineError::InsufficientData(format!(
            "{} labeled rows, need at least {}",
            records.len(),
            config.min_rows
        )));
    }

    let labels: Vec<u8> = records.iter().map(|r| r.label).collect();
    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    if n_pos == 0 || n_pos == labels.len() {
        return Err(EngineError::InsufficientData(format!(
            "single label class present ({})",
            if n_pos == 0 { 0 } else { 1 }
        )));
    }

    // 5-D once any record carries the re-rank signal, 4-D otherwise
    let dim = if records.iter().any(|r| r.has_re_rank()) {
        CORE_DIM_RERANK
    } else {
        CORE_DIM
    };
    let feature_order = core_order(dim);
    let x: Vec<Vec<f64>> = records.iter().map(|r| assemble(&r.signals, dim)).collect();

    let split = split_dataset(&x, &labels, config.validation_split, config.seed);

    let classifier = fit_classifier(&split.train_x, &split.train_y, &split.val_x, &split.val_y, config)?;

    let raw_val = classifier.predict_proba(&split.val_x)?;
    let auc_raw = roc_auc(&split.val_y, &raw_val);
    let pr_raw = pr_auc(&split.val_y, &raw_val);

    let platt = PlattScaler::fit(&raw_val, &split.val_y);
    let isotonic = IsotonicRegressor::fit(&raw_val, &split.val_y);

    let auc_platt = platt.as_ref().map(|p| {
        let cal: Vec<f64> = raw_val.iter().map(|&s| p.calibrate(s)).collect();
        roc_auc(&split.val_y, &cal)
    });
    let auc_isotonic = isotonic.as_ref().map(|iso| {
        let cal: Vec<f64> = raw_val.iter().map(|&s| iso.calibrate(s)).collect();
        roc_auc(&split.val_y, &cal)
    });

    // All fitting succeeded; only now touch the store
    let (weights, intercept) = classifier.coefficients();
    let artifact = ModelArtifact::new(
        classifier.model_type(),
        feature_order,
        weights,
        intercept,
        records.len(),
    );
    let model_version = store.write_new(ArtifactKind::Model, &artifact)?;
    let platt_version = platt
        .map(|p| store.write_new(ArtifactKind::Platt, &p))
        .transpose()?;
    let isotonic_version = isotonic
        .map(|iso| store.write_new(ArtifactKind::Isotonic, &iso))
        .transpose()?;

    let report = TrainingReport {
        n_samples: records.len(),
        n_train: split.train_x.len(),
        n_validation: split.val_x.len(),
        dim,
        model_type: classifier.model_type().to_string(),
        auc_raw,
        pr_auc_raw: pr_raw,
        auc_platt,
        auc_isotonic,
        model_version,
        platt_version,
        isotonic_version,
    };
    log::info!(
        "trained {} model on {} rows (dim {}): val auc {:.4}",
        report.model_type,
        report.n_samples,
        report.dim,
        report.auc_raw
    );
    Ok(report)
}

/// Fit behind the classifier seam. A single-class train split (possible
/// after splitting even when the full set had both classes) falls back to
/// the constant-prior dummy.
fn fit_classifier(
    train_x: &[Vec<f64>],
    train_y: &[u8],
    val_x: &[Vec<f64>],
    val_y: &[u8],
    config: &TrainingConfig,
) -> Result<Box<dyn TrainableClassifier>, EngineError> {
    let n_pos = train_y.iter().filter(|&&l| l == 1).count();
    if n_pos == 0 || n_pos == train_y.len() {
        let dim = train_x.first().map(Vec::len).unwrap_or(0);
        log::warn!("train split is single-class; fitting constant-prior dummy");
        return Ok(Box::new(DummyClassifier::from_labels(train_y, dim)));
    }

    if !config.grid_search {
        let model = LogisticRegression::fit(train_x, train_y, &config.logistic)?;
        return Ok(Box::new(model));
    }

    let mut best: Option<(f64, LogisticRegression)> = None;
    for &l2 in GRID_L2 {
        for &lr in GRID_LR {
            let candidate_config = TrainConfig {
                learning_rate: lr,
                epochs: GRID_EPOCHS,
                l2,
                ..config.logistic.clone()
            };
            let model = LogisticRegression::fit(train_x, train_y, &candidate_config)?;
            let scores = model.predict_proba(val_x)?;
            let auc = roc_auc(val_y, &scores);
            if best.as_ref().map_or(true, |(best_auc, _)| auc > *best_auc) {
                best = Some((auc, model));
            }
        }
    }
    // The grid is non-empty, so best is always set
    let (_, model) = best.expect("non-empty hyperparameter grid");
    Ok(Box::new(model))
}

// ============================================================================
// TESTS
// ============================================================================
