//! Logistic Trainer - From-Scratch Gradient Descent
//!
//! Binary logistic regression with no numerical library behind it. Pure
//! function from (data, config) to weights: deterministic, no randomness,
//! trivially unit-testable against toy datasets.

use serde::{Deserialize, Serialize};

use crate::logic::error::EngineError;

// ============================================================================
// NUMERIC PRIMITIVES
// ============================================================================

/// Sigmoid with saturation guards. Saturates to 1e-15 / 1 - 1e-15 beyond
/// |z| = 35 so probabilities stay strictly inside (0, 1).
pub fn sigmoid(z: f64) -> f64 {
    if z < -35.0 {
        return 1e-15;
    }
    if z > 35.0 {
        return 1.0 - 1e-15;
    }
    1.0 / (1.0 + (-z).exp())
}

/// Inverse of `sigmoid`, clamped to the same saturation range
pub fn logit(p: f64) -> f64 {
    let p = p.clamp(1e-15, 1.0 - 1e-15);
    (p / (1.0 - p)).ln()
}

fn dot(w: &[f64], x: &[f64]) -> f64 {
    w.iter().zip(x).map(|(a, b)| a * b).sum()
}

// ============================================================================
// TRAINING CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 strength; the intercept is excluded from regularization
    pub l2: f64,
    /// Early stop once the gradient norm falls below this
    pub tolerance: f64,
    /// Reweight samples by inverse class frequency
    pub class_balance: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 800,
            l2: 1e-3,
            tolerance: 1e-6,
            class_balance: true,
        }
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Capability seam for anything the orchestrator can fit and persist.
/// A higher-capacity external trainer would slot in behind the same trait.
pub trait TrainableClassifier: Send + Sync {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, EngineError>;
    fn n_features(&self) -> usize;
    fn model_type(&self) -> &'static str;
    /// (weights, intercept) in a form the uniform inference formula accepts
    fn coefficients(&self) -> (Vec<f64>, f64);
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    /// Batch gradient descent. Weights and intercept start at zero; each
    /// epoch applies `w ← w − lr · (Xᵀ(ŷ−y)/n + l2·w)` and stops early when
    /// the gradient norm (intercept included) drops below `tolerance`.
    pub fn fit(x: &[Vec<f64>], y: &[u8], config: &TrainConfig) -> Result<Self, EngineError> {
        if x.is_empty() {
            return Err(EngineError::InsufficientData("empty training set".into()));
        }
        if x.len() != y.len() {
            return Err(EngineError::InsufficientData(format!(
                "{} rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let d = x[0].len();
        for row in x {
            if row.len() != d {
                return Err(EngineError::DimensionMismatch {
                    expected: d,
                    got: row.len(),
                });
            }
        }

        let n = x.len() as f64;
        let n_pos = y.iter().filter(|&&v| v == 1).count() as f64;
        let n_neg = n - n_pos;
        let (w_pos, w_neg) = if config.class_balance {
            (
                if n_pos > 0.0 { n / (2.0 * n_pos) } else { 1.0 },
                if n_neg > 0.0 { n / (2.0 * n_neg) } else { 1.0 },
            )
        } else {
            (1.0, 1.0)
        };

        let mut weights = vec![0.0; d];
        let mut intercept = 0.0;

        for _ in 0..config.epochs {
            let mut grad_w = vec![0.0; d];
            let mut grad_b = 0.0;

            for (xi, &yi) in x.iter().zip(y) {
                let p = sigmoid(intercept + dot(&weights, xi));
                let err = p - f64::from(yi);
                let sample_w = if yi == 1 { w_pos } else { w_neg };
                for j in 0..d {
                    grad_w[j] += sample_w * err * xi[j];
                }
                grad_b += sample_w * err;
            }

            for j in 0..d {
                grad_w[j] = grad_w[j] / n + config.l2 * weights[j];
            }
            grad_b /= n;

            for j in 0..d {
                weights[j] -= config.learning_rate * grad_w[j];
            }
            intercept -= config.learning_rate * grad_b;

            let norm =
                (grad_w.iter().map(|g| g * g).sum::<f64>() + grad_b * grad_b).sqrt();
            if norm < config.tolerance {
                break;
            }
        }

        Ok(Self { weights, intercept })
    }

    /// Probability for a single row
    pub fn predict_one(&self, row: &[f64]) -> Result<f64, EngineError> {
        if row.len() != self.weights.len() {
            return Err(EngineError::DimensionMismatch {
                expected: self.weights.len(),
                got: row.len(),
            });
        }
        Ok(sigmoid(self.intercept + dot(&self.weights, row)))
    }
}

impl TrainableClassifier for LogisticRegression {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, EngineError> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn model_type(&self) -> &'static str {
        "logistic"
    }

    fn coefficients(&self) -> (Vec<f64>, f64) {
        (self.weights.clone(), self.intercept)
    }
}

// ============================================================================
// DUMMY CLASSIFIER
// ============================================================================

/// Constant-probability classifier predicting the training label rate.
/// Safety fallback when a train split ends up single-class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DummyClassifier {
    pub prior: f64,
    pub n_features: usize,
}

impl DummyClassifier {
    pub fn from_labels(y: &[u8], n_features: usize) -> Self {
        let prior = if y.is_empty() {
            0.5
        } else {
            y.iter().filter(|&&v| v == 1).count() as f64 / y.len() as f64
        };
        Self { prior, n_features }
    }
}

impl TrainableClassifier for DummyClassifier {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, EngineError> {
        for row in rows {
            if row.len() != self.n_features {
                return Err(EngineError::DimensionMismatch {
                    expected: self.n_features,
                    got: row.len(),
                });
            }
        }
        // Route through sigmoid(logit(prior)) so the prior respects the same
        // (0,1) saturation bounds as real inference.
        let p = sigmoid(logit(self.prior));
        Ok(vec![p; rows.len()])
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn model_type(&self) -> &'static str {
        "dummy"
    }

    fn coefficients(&self) -> (Vec<f64>, f64) {
        // Zero weights + logit(prior) intercept makes the uniform inference
        // formula reproduce the constant prior.
        (vec![0.0; self.n_features], logit(self.prior))
    }
}

// ============================================================================
// TESTS
// ============================================================================
