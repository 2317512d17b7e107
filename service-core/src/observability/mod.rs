pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, shutdown_tracing};
pub use metrics::{HttpMetrics, LATENCY_BUCKETS, PROMETHEUS_CONTENT_TYPE, render};
