#![allow(dead_code)]

use hand_sign_service::config::{HandSignConfig, ModelConfig, StaticFilesConfig};
use hand_sign_service::models::ClassLabels;
use hand_sign_service::services::{AppMetrics, Classifier};
use hand_sign_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::path::PathBuf;
use std::sync::Arc;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn test_config() -> HandSignConfig {
    HandSignConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port for testing
            ..CoreConfig::default()
        },
        model: ModelConfig {
            path: fixture_path("model.json"),
            classes: ClassLabels::default(),
        },
        static_files: StaticFilesConfig {
            dir: fixture_path("static"),
        },
    }
}

/// 21 landmarks of a hand whose middle finger points along `(dx, dy)` from
/// the wrist, in image coordinates (y grows downwards).
pub fn hand_pointing(dx: f64, dy: f64) -> Vec<Vec<f64>> {
    let (wrist_x, wrist_y) = (0.52, 0.81);
    (0..21)
        .map(|i| {
            if i == 12 {
                vec![wrist_x + dx, wrist_y + dy]
            } else {
                let t = i as f64;
                vec![wrist_x + 0.004 * t * dx.signum(), wrist_y + 0.003 * t]
            }
        })
        .collect()
}

pub fn predict_body(landmarks: Vec<Vec<f64>>) -> Value {
    json!({ "landmarks": landmarks })
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub metrics: AppMetrics,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawns the service with the fixture model.
    pub async fn spawn() -> Self {
        let app = Application::build(test_config())
            .await
            .expect("Failed to build test application");
        Self::launch(app)
    }

    /// Spawns the service with a substitute model.
    pub async fn spawn_with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        let app = Application::build_with_classifier(test_config(), classifier)
            .await
            .expect("Failed to build test application");
        Self::launch(app)
    }

    fn launch(app: Application) -> Self {
        let port = app.port();
        let metrics = app.state().metrics.clone();

        // The listener is already bound, so requests queue until the server
        // task starts accepting.
        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            metrics,
            client: reqwest::Client::new(),
        }
    }

    pub async fn predict(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/predict", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
