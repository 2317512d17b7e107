use crate::models::{ClassLabels, LandmarkSet, FEATURE_COUNT};
use crate::services::classifier::{Classifier, ClassifierError};
use crate::services::metrics::AppMetrics;
use crate::services::normalizer::normalize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("model has {model} classes but {labels} labels are configured")]
    LabelCountMismatch { model: usize, labels: usize },

    #[error("model expects {0} features, normalized landmarks provide 42")]
    FeatureCountMismatch(usize),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("model returned {actual} scores for {expected} classes")]
    ScoreCount { expected: usize, actual: usize },

    #[error("model returned NaN for class {0}")]
    NanScore(usize),
}

/// Landmarks in, gesture label out.
///
/// Holds the shared model, the label order it was trained with, and the
/// prediction counter.
pub struct InferenceService {
    classifier: Arc<dyn Classifier>,
    labels: ClassLabels,
    metrics: AppMetrics,
}

impl InferenceService {
    /// Fails when the label list or the feature count disagree with the
    /// model, so a mismatched deployment never serves traffic.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        labels: ClassLabels,
        metrics: AppMetrics,
    ) -> Result<Self, InferenceError> {
        if classifier.num_classes() != labels.len() {
            return Err(InferenceError::LabelCountMismatch {
                model: classifier.num_classes(),
                labels: labels.len(),
            });
        }
        if classifier.num_features() != FEATURE_COUNT {
            return Err(InferenceError::FeatureCountMismatch(
                classifier.num_features(),
            ));
        }

        Ok(Self {
            classifier,
            labels,
            metrics,
        })
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    /// Normalizes, scores, and returns the label with the highest score.
    /// Ties go to the lowest index.
    pub fn predict(&self, landmarks: &LandmarkSet) -> Result<&str, InferenceError> {
        let features = normalize(landmarks).to_f32();
        let scores = self.classifier.predict_scores(&features)?;

        if scores.len() != self.labels.len() {
            return Err(InferenceError::ScoreCount {
                expected: self.labels.len(),
                actual: scores.len(),
            });
        }

        let index = argmax(&scores)?;
        let label = self.labels.get(index).ok_or(InferenceError::ScoreCount {
            expected: self.labels.len(),
            actual: scores.len(),
        })?;

        self.metrics.record_prediction(label);
        tracing::debug!(hand_sign = label, score = scores[index], "Prediction completed");

        Ok(label)
    }

    /// Liveness only; the model is loaded before the listener is bound.
    pub fn health(&self) -> &'static str {
        "ok"
    }
}

fn argmax(scores: &[f32]) -> Result<usize, InferenceError> {
    let mut best = 0;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            return Err(InferenceError::NanScore(index));
        }
        if score > scores[best] {
            best = index;
        }
    }
    Ok(best)
}
