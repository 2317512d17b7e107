use crate::dtos::{PredictRequest, PredictResponse};
use crate::models::LandmarkSet;
use crate::startup::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use service_core::error::AppError;

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(request) = payload?;

    let landmarks = LandmarkSet::try_from(request.landmarks)
        .map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;

    let hand_sign = state.inference.predict(&landmarks).map_err(|e| {
        tracing::error!(error = %e, "Inference failed");
        AppError::InternalError(anyhow::Error::new(e))
    })?;

    Ok(Json(PredictResponse {
        hand_sign: hand_sign.to_string(),
    }))
}
