use crate::startup::AppState;
use axum::{extract::State, http::header, response::IntoResponse};
use service_core::error::AppError;
use service_core::observability::PROMETHEUS_CONTENT_TYPE;

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to encode metrics: {}", e))
    })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
