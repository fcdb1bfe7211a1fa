//! Responder abstraction and implementations.
//!
//! A responder maps the user's text to a display-ready reply. The gateway
//! never looks inside it; intent matching and inference live behind this
//! trait, usually in a separate classifier process.

pub mod echo;
pub mod http;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

pub use echo::EchoResponder;
pub use http::{HttpResponder, HttpResponderConfig};

/// Error type for responder operations.
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("Responder not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Classifier returned status {status}")]
    Upstream { status: u16 },

    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),
}

impl ResponderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponderError::NotConfigured(_) => "not_configured",
            ResponderError::Network(_) => "network",
            ResponderError::Upstream { .. } => "upstream",
            ResponderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<ResponderError> for AppError {
    fn from(err: ResponderError) -> Self {
        match err {
            ResponderError::NotConfigured(_) => AppError::InternalError(anyhow::Error::new(err)),
            ResponderError::Network(_)
            | ResponderError::Upstream { .. }
            | ResponderError::InvalidResponse(_) => AppError::BadGateway(err.to_string()),
        }
    }
}

/// Generates chatbot replies.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce a reply for `text`. Must accept any string, including "".
    ///
    /// `request_id` is for correlation only and must not change the reply.
    async fn generate_response(
        &self,
        text: &str,
        request_id: Option<&str>,
    ) -> Result<String, ResponderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ResponderError>;

    /// Name used in logs and metric labels.
    fn name(&self) -> &'static str;
}
