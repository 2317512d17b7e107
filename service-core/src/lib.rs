//! service-core: Shared infrastructure for HTTP microservices.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use prometheus;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tower_http;
pub use tracing;
