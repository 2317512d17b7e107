//! Service metrics.
//!
//! One [`AppMetrics`] is built at startup and handed to the router and the
//! inference service. Clones share the same underlying counters.

use prometheus::{IntCounterVec, Opts, Registry};
use service_core::observability::{self, HttpMetrics};

/// Prefix for the request counter and latency histogram.
pub const METRIC_PREFIX: &str = "hand_sign";

#[derive(Clone)]
pub struct AppMetrics {
    registry: Registry,
    http: HttpMetrics,
    predictions: IntCounterVec,
}

impl AppMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let http = HttpMetrics::register(&registry, METRIC_PREFIX)?;

        let predictions = IntCounterVec::new(
            Opts::new(
                format!("{}_prediction_total", METRIC_PREFIX),
                "Count of predictions per class",
            ),
            &["class"],
        )?;
        registry.register(Box::new(predictions.clone()))?;

        Ok(Self {
            registry,
            http,
            predictions,
        })
    }

    pub fn http(&self) -> &HttpMetrics {
        &self.http
    }

    pub fn record_prediction(&self, class: &str) {
        self.predictions.with_label_values(&[class]).inc();
    }

    pub fn prediction_count(&self, class: &str) -> u64 {
        self.predictions.with_label_values(&[class]).get()
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> prometheus::Result<String> {
        observability::render(&self.registry)
    }
}
