use serde::{Deserialize, Serialize};

/// Body of `POST /predict`. Shape is checked when converting to
/// [`crate::models::LandmarkSet`], not during deserialization, so callers get
/// a 400 with a specific message instead of a generic parse error.
#[derive(Debug, Deserialize, Serialize)]
pub struct PredictRequest {
    pub landmarks: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictResponse {
    pub hand_sign: String,
}
