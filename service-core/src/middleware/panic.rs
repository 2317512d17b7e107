use crate::error::AppError;
use axum::response::{IntoResponse, Response};
use std::any::Any;

/// Handler for `tower_http::catch_panic::CatchPanicLayer::custom`: a panicking
/// request becomes a 500 instead of tearing down the connection task.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::InternalError(anyhow::anyhow!("request handler panicked: {}", message))
        .into_response()
}
