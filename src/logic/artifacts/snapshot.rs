//! Scoring Snapshot & Hot Reload
//!
//! The engine owns one immutable `(predictor, calibrator)` snapshot behind
//! an `Arc`. Scoring calls clone the `Arc` and run entirely against that
//! value, so a concurrent republish never changes a call already in flight.
//! Staleness is re-checked at most once per configured interval; a failed
//! reload keeps the previous snapshot active and only logs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::constants::{APP_NAME, DEFAULT_RELOAD_INTERVAL_SECS};
use crate::logic::calibration::{Calibrator, IsotonicRegressor, PlattScaler};
use crate::logic::error::EngineError;
use crate::logic::features::vector::SignalMap;
use crate::logic::model::predictor::Predictor;
use crate::logic::model::weights::WeightsConfig;
use crate::logic::risk::RiskThresholds;
use crate::logic::scoring::{score_pair, ScoringResult};

use super::store::FsArtifactStore;
use super::types::{ArtifactKind, ModelArtifact};

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Modification markers of everything a snapshot was built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SnapshotMarkers {
    model: Option<SystemTime>,
    platt: Option<SystemTime>,
    isotonic: Option<SystemTime>,
    weights: Option<SystemTime>,
}

/// The currently active scoring state. Immutable after construction; a
/// reload builds a complete new snapshot and swaps the `Arc`.
#[derive(Debug)]
pub struct ScoringSnapshot {
    pub predictor: Predictor,
    pub calibrator: Calibrator,
    pub loaded_at: DateTime<Utc>,
    markers: SnapshotMarkers,
}

impl ScoringSnapshot {
    /// No-model state: built-in blend weights, identity calibration
    pub fn fallback() -> Self {
        Self {
            predictor: Predictor::Blend(WeightsConfig::default()),
            calibrator: Calibrator::Identity,
            loaded_at: Utc::now(),
            markers: SnapshotMarkers::default(),
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub artifact_dir: PathBuf,
    /// Externally editable fallback weights file; built-in defaults if absent
    pub weights_path: Option<PathBuf>,
    pub thresholds: RiskThresholds,
    /// Bounded staleness window for artifact re-checks
    pub reload_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME);
        Self {
            artifact_dir: base.join("artifacts"),
            weights_path: Some(base.join("weights.json")),
            thresholds: RiskThresholds::default(),
            reload_interval: Duration::from_secs(DEFAULT_RELOAD_INTERVAL_SECS),
        }
    }
}

// ============================================================================
// STATUS
// ============================================================================

/// Engine status for callers/UI
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub predictor: &'static str,
    pub calibrator: &'static str,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug)]
pub struct ScoringEngine {
    store: FsArtifactStore,
    weights_path: Option<PathBuf>,
    thresholds: RiskThresholds,
    reload_interval: Duration,
    active: RwLock<Arc<ScoringSnapshot>>,
    last_check: Mutex<Option<Instant>>,
}

impl ScoringEngine {
    /// Build the engine and load the initial snapshot. Malformed
    /// configuration (thresholds, weights file) fails fast here; a corrupt
    /// artifact only degrades to the fallback snapshot with a warning.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.thresholds.validate()?;
        let store = FsArtifactStore::new(&config.artifact_dir)?;

        // Surface a broken weights file at startup instead of per-request
        if let Some(path) = config.weights_path.as_deref() {
            if path.exists() {
                WeightsConfig::load(path)?;
            }
        }

        let engine = Self {
            store,
            weights_path: config.weights_path,
            thresholds: config.thresholds,
            reload_interval: config.reload_interval,
            active: RwLock::new(Arc::new(ScoringSnapshot::fallback())),
            last_check: Mutex::new(None),
        };

        match engine.build_snapshot() {
            Ok(snapshot) => *engine.active.write() = Arc::new(snapshot),
            Err(e) => log::warn!("initial artifact load failed ({}), starting with fallback", e),
        }
        Ok(engine)
    }

    /// Score one pair against the active snapshot. Never fails: always a
    /// finite score in [0, 1] plus a risk label.
    pub fn score(&self, signals: &SignalMap) -> ScoringResult {
        let snapshot = self.snapshot();
        score_pair(&snapshot, &self.thresholds, signals)
    }

    /// The active snapshot, after an at-most-once-per-interval staleness
    /// check. Callers holding the returned `Arc` are immune to republishes.
    pub fn snapshot(&self) -> Arc<ScoringSnapshot> {
        self.maybe_reload();
        self.active.read().clone()
    }

    pub fn status(&self) -> EngineStatus {
        let snapshot = self.active.read().clone();
        EngineStatus {
            model_loaded: snapshot.predictor.is_trained(),
            predictor: snapshot.predictor.kind(),
            calibrator: snapshot.calibrator.kind(),
            loaded_at: snapshot.loaded_at,
        }
    }

    /// Compare persisted artifact markers against the active snapshot and
    /// republish if anything changed. `try_lock` keeps concurrent scorers
    /// from queueing behind one reloader.
    pub fn maybe_reload(&self) {
        let Some(mut last_check) = self.last_check.try_lock() else {
            return;
        };
        if let Some(checked) = *last_check {
            if checked.elapsed() < self.reload_interval {
                return;
            }
        }
        *last_check = Some(Instant::now());

        let markers = self.read_markers();
        if markers == self.active.read().markers {
            return;
        }

        match self.build_snapshot() {
            Ok(snapshot) => {
                log::info!(
                    "scoring snapshot reloaded: predictor={} calibrator={}",
                    snapshot.predictor.kind(),
                    snapshot.calibrator.kind()
                );
                *self.active.write() = Arc::new(snapshot);
            }
            Err(e) => {
                log::warn!("artifact reload failed ({}); keeping previous snapshot", e);
            }
        }
    }

    fn read_markers(&self) -> SnapshotMarkers {
        SnapshotMarkers {
            model: self.store.active_marker(ArtifactKind::Model),
            platt: self.store.active_marker(ArtifactKind::Platt),
            isotonic: self.store.active_marker(ArtifactKind::Isotonic),
            weights: self
                .weights_path
                .as_deref()
                .and_then(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok()),
        }
    }

    /// Load everything into a complete snapshot before any publish. Errors
    /// here leave the previous snapshot untouched.
    fn build_snapshot(&self) -> Result<ScoringSnapshot, EngineError> {
        let markers = self.read_markers();

        let model = self
            .store
            .read_active::<ModelArtifact>(ArtifactKind::Model)?
            .map(|(artifact, _)| artifact);
        if let Some(artifact) = model.as_ref() {
            artifact.validate()?;
        }

        let predictor = match model {
            Some(artifact) => Predictor::Trained(Arc::new(artifact)),
            None => {
                let weights = match self.weights_path.as_deref() {
                    Some(path) if path.exists() => WeightsConfig::load(path)?,
                    _ => WeightsConfig::default(),
                };
                Predictor::Blend(weights)
            }
        };

        // Fixed priority: Platt over Isotonic over identity
        let calibrator = if let Some((platt, _)) = self
            .store
            .read_active::<PlattScaler>(ArtifactKind::Platt)?
        {
            Calibrator::Platt(platt)
        } else if let Some((iso, _)) = self
            .store
            .read_active::<IsotonicRegressor>(ArtifactKind::Isotonic)?
        {
            Calibrator::Isotonic(iso)
        } else {
            Calibrator::Identity
        };

        Ok(ScoringSnapshot {
            predictor,
            calibrator,
            loaded_at: Utc::now(),
            markers,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::core_order;
    use crate::logic::features::vector::signal_map;
    use crate::logic::risk::RiskLevel;

    fn test_engine(dir: &std::path::Path) -> ScoringEngine {
        ScoringEngine::new(EngineConfig {
            artifact_dir: dir.to_path_buf(),
            weights_path: None,
            thresholds: RiskThresholds::default(),
            // Re-check on every call so tests see publishes immediately
            reload_interval: Duration::ZERO,
        })
        .unwrap()
    }

    fn strong_signals() -> SignalMap {
        signal_map([
            ("jaccard", 0.9),
            ("tfidf", 0.95),
            ("ngram", 0.88),
            ("paraphrase", 0.92),
        ])
    }

    #[test]
    fn test_starts_in_fallback_state() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        let status = engine.status();
        assert!(!status.model_loaded);
        assert_eq!(status.predictor, "blend");
        assert_eq!(status.calibrator, "identity");
    }

    #[test]
    fn test_fallback_scoring_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        let result = engine.score(&strong_signals());
        assert!(result.score > 0.85);
        assert_eq!(result.risk, RiskLevel::High);
    }

    #[test]
    fn test_publish_swaps_to_trained_model() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        assert!(!engine.status().model_loaded);

        let store = FsArtifactStore::new(dir.path()).unwrap();
        let artifact = ModelArtifact::new("logistic", core_order(4), vec![3.0; 4], -6.0, 50);
        store.write_new(ArtifactKind::Model, &artifact).unwrap();

        let snapshot = engine.snapshot();
        assert!(snapshot.predictor.is_trained());
        assert!(engine.status().model_loaded);
    }

    #[test]
    fn test_inflight_snapshot_unaffected_by_publish() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());

        // A call in flight holds this snapshot
        let held = engine.snapshot();
        let before = score_pair(&held, &RiskThresholds::default(), &strong_signals());

        let store = FsArtifactStore::new(dir.path()).unwrap();
        let artifact = ModelArtifact::new("logistic", core_order(4), vec![0.1; 4], -3.0, 50);
        store.write_new(ArtifactKind::Model, &artifact).unwrap();

        // New calls see the model; the held snapshot still scores as before
        assert!(engine.snapshot().predictor.is_trained());
        let after = score_pair(&held, &RiskThresholds::default(), &strong_signals());
        assert_eq!(before.score.to_bits(), after.score.to_bits());
        assert_eq!(before.risk, after.risk);
    }

    #[test]
    fn test_corrupt_artifact_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());

        let store = FsArtifactStore::new(dir.path()).unwrap();
        let artifact = ModelArtifact::new("logistic", core_order(4), vec![3.0; 4], -6.0, 50);
        store.write_new(ArtifactKind::Model, &artifact).unwrap();
        assert!(engine.snapshot().predictor.is_trained());

        // Corrupt the active file; the engine must keep the loaded model
        std::fs::write(dir.path().join("model.json"), b"garbage").unwrap();
        let snapshot = engine.snapshot();
        assert!(snapshot.predictor.is_trained());
        let result = engine.score(&strong_signals());
        assert!((0.0..=1.0).contains(&result.score));
    }

    #[test]
    fn test_platt_takes_priority_over_isotonic() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();
        store
            .write_new(ArtifactKind::Isotonic, &IsotonicRegressor {
                breakpoints: vec![0.0, 1.0],
                values: vec![0.0, 1.0],
            })
            .unwrap();
        store
            .write_new(ArtifactKind::Platt, &PlattScaler { a: 1.0, b: 0.0 })
            .unwrap();

        let engine = test_engine(dir.path());
        assert_eq!(engine.status().calibrator, "platt");
    }

    #[test]
    fn test_invalid_thresholds_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScoringEngine::new(EngineConfig {
            artifact_dir: dir.path().to_path_buf(),
            weights_path: None,
            thresholds: RiskThresholds {
                high: 0.2,
                medium: 0.7,
                low: 0.5,
            },
            reload_interval: Duration::ZERO,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_malformed_weights_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let weights_path = dir.path().join("weights.json");
        std::fs::write(&weights_path, b"{\"weights\": \"nope\"}").unwrap();

        let err = ScoringEngine::new(EngineConfig {
            artifact_dir: dir.path().join("artifacts"),
            weights_path: Some(weights_path),
            thresholds: RiskThresholds::default(),
            reload_interval: Duration::ZERO,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_tuned_weights_file_drives_blend() {
        let dir = tempfile::tempdir().unwrap();
        let weights_path = dir.path().join("weights.json");
        // Everything on jaccard: blend score equals the jaccard signal
        let tuned = WeightsConfig {
            feature_order: vec!["jaccard".into()],
            weights: vec![1.0],
            auc: Some(0.9),
            n_samples: Some(25),
        };
        std::fs::write(&weights_path, serde_json::to_vec(&tuned).unwrap()).unwrap();

        let engine = ScoringEngine::new(EngineConfig {
            artifact_dir: dir.path().join("artifacts"),
            weights_path: Some(weights_path),
            thresholds: RiskThresholds::default(),
            reload_interval: Duration::ZERO,
        })
        .unwrap();

        let result = engine.score(&signal_map([("jaccard", 0.63), ("tfidf", 0.1)]));
        assert!((result.score - 0.63).abs() < 1e-12);
    }
}
