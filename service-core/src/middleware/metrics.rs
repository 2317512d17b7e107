use crate::observability::HttpMetrics;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// `endpoint` label for requests no route or file answered.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Times every request and counts it by method, endpoint and final status,
/// error responses included.
///
/// Routed requests are labelled with their route pattern. Fallback requests
/// keep their path only when the fallback served them, so unknown URLs all
/// share [`UNMATCHED_ENDPOINT`].
pub async fn metrics_middleware(
    State(metrics): State<HttpMetrics>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let matched = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string());
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status();

    let endpoint = match matched {
        Some(route) => route,
        None if status.is_success() || status.is_redirection() => path,
        None => UNMATCHED_ENDPOINT.to_string(),
    };

    metrics.observe(&method, &endpoint, status.as_u16(), start.elapsed());

    response
}
