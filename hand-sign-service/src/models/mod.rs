pub mod features;
pub mod labels;
pub mod landmarks;

pub use features::{FeatureVector, FEATURE_COUNT};
pub use labels::{ClassLabels, LabelError, DEFAULT_CLASSES};
pub use landmarks::{
    LandmarkSet, Point, ShapeError, LANDMARK_COUNT, MIDDLE_FINGER_TIP, POINT_ARITY, WRIST,
};
