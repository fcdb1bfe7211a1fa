//! Responder backed by an external classifier over HTTP.
//!
//! The classifier speaks the same envelope as the gateway:
//! `POST {"message": ...}` answered with `{"answer": ...}`.

use super::{Responder, ResponderError};
use crate::models::ChatResponse;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use service_core::observability::TracedClientExt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpResponderConfig {
    /// Classification endpoint.
    pub url: String,
    /// Optional liveness endpoint. Without one the health check only
    /// confirms the responder is configured.
    pub health_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ClassifierRequest<'a> {
    message: &'a str,
}

pub struct HttpResponder {
    config: HttpResponderConfig,
    client: Client,
}

impl HttpResponder {
    pub fn new(config: HttpResponderConfig) -> Result<Self, ResponderError> {
        if config.url.trim().is_empty() {
            return Err(ResponderError::NotConfigured(
                "Classifier URL is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ResponderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn generate_response(
        &self,
        text: &str,
        request_id: Option<&str>,
    ) -> Result<String, ResponderError> {
        let request = self
            .client
            .traced_post(&self.config.url)
            .json(&ClassifierRequest { message: text });

        let response = match request_id {
            Some(id) => request.send_with_request_id(id).await,
            None => request.send().await,
        }
        .map_err(|e| ResponderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %self.config.url,
                status = status.as_u16(),
                "Classifier returned non-success status"
            );
            return Err(ResponderError::Upstream {
                status: status.as_u16(),
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::InvalidResponse(e.to_string()))?;

        Ok(reply.answer)
    }

    async fn health_check(&self) -> Result<(), ResponderError> {
        let Some(health_url) = &self.config.health_url else {
            return Ok(());
        };

        let response = self
            .client
            .traced_get(health_url)
            .send()
            .await
            .map_err(|e| ResponderError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ResponderError::Upstream {
                status: response.status().as_u16(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
