#![allow(dead_code)]

use async_trait::async_trait;
use chatbot_service::config::{
    ChatbotConfig, ObservabilityConfig, ResourceConfig, ResponderConfig, ResponderKind,
};
use chatbot_service::services::{EchoResponder, Responder, ResponderError};
use chatbot_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub fn static_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

pub fn test_config(data_dir: &Path) -> ChatbotConfig {
    ChatbotConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port for testing
        },
        responder: ResponderConfig {
            kind: ResponderKind::Echo,
            url: String::new(),
            health_url: None,
            timeout_secs: 5,
        },
        resources: ResourceConfig {
            bundle_url: None,
            data_dir: data_dir.to_path_buf(),
            bundle_name: "punkt.zip".to_string(),
        },
        observability: ObservabilityConfig {
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
        static_dir: static_dir(),
    }
}

/// Responder that always fails the way an unreachable classifier does.
pub struct FailingResponder;

#[async_trait]
impl Responder for FailingResponder {
    async fn generate_response(
        &self,
        _text: &str,
        _request_id: Option<&str>,
    ) -> Result<String, ResponderError> {
        Err(ResponderError::Network("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<(), ResponderError> {
        Err(ResponderError::Network("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Echo responder whose latency depends on the input, so concurrent
/// requests finish out of order.
pub struct SlowEchoResponder;

#[async_trait]
impl Responder for SlowEchoResponder {
    async fn generate_response(
        &self,
        text: &str,
        _request_id: Option<&str>,
    ) -> Result<String, ResponderError> {
        let delay = (text.len() as u64 * 7) % 50;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(EchoResponder::reply_for(text))
    }

    async fn health_check(&self) -> Result<(), ResponderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slow-echo"
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    _data_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(EchoResponder::default())).await
    }

    pub async fn spawn_with(responder: Arc<dyn Responder>) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create data dir");
        let config = test_config(data_dir.path());

        let app = Application::build_with_responder(config, responder)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            client,
            _data_dir: data_dir,
        }
    }

    pub async fn post_predict(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/predict", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }
}
