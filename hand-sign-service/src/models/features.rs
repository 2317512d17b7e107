use super::landmarks::{LANDMARK_COUNT, POINT_ARITY};

/// Length of the flattened, normalized landmark vector.
pub const FEATURE_COUNT: usize = LANDMARK_COUNT * POINT_ARITY;

/// Row-major `(x0, y0, x1, y1, ..., x20, y20)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Narrows to `f32`, the precision tree ensembles are evaluated in.
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }
}
