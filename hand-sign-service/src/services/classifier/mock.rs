//! Mock classifier for testing.

use super::{Classifier, ClassifierError};
use crate::models::FEATURE_COUNT;

/// Returns the same scores for every input.
pub struct FixedScoresClassifier {
    scores: Vec<f32>,
    num_features: usize,
}

impl FixedScoresClassifier {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            num_features: FEATURE_COUNT,
        }
    }

    /// Overrides the advertised input length, for exercising startup checks.
    pub fn with_num_features(mut self, num_features: usize) -> Self {
        self.num_features = num_features;
        self
    }
}

impl Classifier for FixedScoresClassifier {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn num_classes(&self) -> usize {
        self.scores.len()
    }

    fn predict_scores(&self, features: &[f32]) -> Result<Vec<f32>, ClassifierError> {
        if features.len() != self.num_features {
            return Err(ClassifierError::FeatureCount {
                expected: self.num_features,
                actual: features.len(),
            });
        }
        Ok(self.scores.clone())
    }
}
