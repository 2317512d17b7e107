//! Prometheus HTTP metrics.
//!
//! Each service owns its own [`Registry`]; nothing here is global, so tests
//! can build as many independent registries as they like.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Latency buckets in seconds.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Request counter and latency histogram shared by every route.
#[derive(Clone)]
pub struct HttpMetrics {
    requests_total: IntCounterVec,
    request_latency: HistogramVec,
}

impl HttpMetrics {
    /// Registers `<prefix>_requests_total` and
    /// `<prefix>_request_latency_seconds` with `registry`.
    pub fn register(registry: &Registry, prefix: &str) -> prometheus::Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new(
                format!("{}_requests_total", prefix),
                "Total requests by method, endpoint and status",
            ),
            &["method", "endpoint", "http_status"],
        )?;

        let request_latency = HistogramVec::new(
            HistogramOpts::new(
                format!("{}_request_latency_seconds", prefix),
                "Request latency in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["endpoint"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;

        Ok(Self {
            requests_total,
            request_latency,
        })
    }

    pub fn observe(&self, method: &str, endpoint: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, status.as_str()])
            .inc();
        self.request_latency
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }

    pub fn request_count(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, status.as_str()])
            .get()
    }

    pub fn latency_sample_count(&self, endpoint: &str) -> u64 {
        self.request_latency
            .with_label_values(&[endpoint])
            .get_sample_count()
    }
}

/// Renders every metric family in `registry` in the text exposition format.
pub fn render(registry: &Registry) -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
