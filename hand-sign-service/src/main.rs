use hand_sign_service::config::HandSignConfig;
use hand_sign_service::startup::Application;
use service_core::observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HandSignConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "hand-sign-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start hand-sign-service: {:#}", e);
        e
    })?;

    let result = app.run_until_stopped().await;
    if let Err(e) = &result {
        tracing::error!("Server error: {}", e);
    }

    shutdown_tracing();
    result?;

    Ok(())
}
