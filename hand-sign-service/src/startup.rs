use crate::config::HandSignConfig;
use crate::handlers;
use crate::services::{AppMetrics, Classifier, InferenceService, XgboostModel};
use anyhow::Context;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    make_request_span, metrics_middleware, panic_response, request_id_middleware,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub inference: Arc<InferenceService>,
    pub metrics: AppMetrics,
}

/// Routes plus the layer stack, outermost first: tracing span, request id,
/// metrics, CORS, panic recovery. Anything unrouted is served from
/// `static_dir`.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let http_metrics = state.metrics.http().clone();

    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::very_permissive())
        .layer(from_fn_with_state(http_metrics, metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Loads the model named in `config` and binds the listener. Any failure
    /// here is fatal: the service never accepts a request without a model.
    pub async fn build(config: HandSignConfig) -> anyhow::Result<Self> {
        let model = XgboostModel::load(&config.model.path)
            .with_context(|| format!("Failed to load model {}", config.model.path.display()))?;

        tracing::info!(
            path = %config.model.path.display(),
            objective = ?model.objective(),
            trees = model.num_trees(),
            classes = model.num_classes(),
            "Model loaded"
        );

        Self::build_with_classifier(config, Arc::new(model)).await
    }

    /// Same as [`Application::build`] with an already constructed model.
    pub async fn build_with_classifier(
        config: HandSignConfig,
        classifier: Arc<dyn Classifier>,
    ) -> anyhow::Result<Self> {
        let metrics = AppMetrics::new()
            .map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

        let inference =
            InferenceService::new(classifier, config.model.classes.clone(), metrics.clone())
                .context("Model does not match configured classes")?;

        tracing::info!(
            classes = ?inference.labels().iter().collect::<Vec<_>>(),
            "Inference service ready"
        );

        let state = AppState {
            inference: Arc::new(inference),
            metrics,
        };

        let router = build_router(state.clone(), &config.static_files.dir);

        let addr = (config.common.host.as_str(), config.common.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(
                "Failed to bind TCP listener to {}:{}: {}",
                config.common.host,
                config.common.port,
                e
            );
            e
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
