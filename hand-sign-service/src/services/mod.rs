pub mod classifier;
pub mod inference;
pub mod metrics;
pub mod normalizer;

pub use classifier::{Classifier, ClassifierError, ModelError, XgboostModel};
pub use inference::{InferenceError, InferenceService};
pub use metrics::AppMetrics;
pub use normalizer::normalize;
