//! Model Module - Training & Prediction
//!
//! - `logistic` - from-scratch gradient-descent binary classifier
//! - `weights` - editable fallback blend weights
//! - `predictor` - polymorphic scorer (trained model vs weighted blend)

pub mod logistic;
pub mod predictor;
pub mod weights;

pub use logistic::{sigmoid, DummyClassifier, LogisticRegression, TrainConfig, TrainableClassifier};
pub use predictor::Predictor;
pub use weights::WeightsConfig;
