//! Classifier abstraction.
//!
//! The service only needs "feature vector in, one score per class out", so
//! the model sits behind a small trait. Production uses [`XgboostModel`];
//! tests can substitute [`mock::FixedScoresClassifier`].

pub mod mock;
pub mod xgboost;

pub use xgboost::{ModelError, XgboostModel};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

/// A loaded, immutable model.
///
/// Implementations are shared across request tasks behind an `Arc`, so
/// `predict_scores` must be safe to call concurrently through `&self`.
pub trait Classifier: Send + Sync {
    /// Length of the input vector the model was trained on.
    fn num_features(&self) -> usize;

    /// Number of scores returned per prediction.
    fn num_classes(&self) -> usize;

    /// One score per class in training order; higher means more likely.
    fn predict_scores(&self, features: &[f32]) -> Result<Vec<f32>, ClassifierError>;
}
