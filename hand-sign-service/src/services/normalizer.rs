//! Wrist-relative landmark normalization.
//!
//! Translates every point so the wrist is the origin, then divides by the
//! wrist-to-middle-fingertip distance. The result does not depend on where
//! the hand sits in the frame or how large it appears.

use crate::models::{FeatureVector, LandmarkSet, FEATURE_COUNT};

/// Maps 21 landmarks to the 42-value model input.
///
/// A zero wrist-to-fingertip distance is replaced by 1, so coincident points
/// yield wrist-relative but unscaled output rather than a division by zero.
pub fn normalize(landmarks: &LandmarkSet) -> FeatureVector {
    let wrist = landmarks.wrist();
    let tip = landmarks.middle_finger_tip();

    let (dx, dy) = (tip.x - wrist.x, tip.y - wrist.y);
    let distance = (dx * dx + dy * dy).sqrt();
    let scale = if distance == 0.0 { 1.0 } else { distance };

    let mut values = [0.0; FEATURE_COUNT];
    for (pair, point) in values.chunks_exact_mut(2).zip(landmarks.points()) {
        pair[0] = (point.x - wrist.x) / scale;
        pair[1] = (point.y - wrist.y) / scale;
    }

    FeatureVector::new(values)
}
