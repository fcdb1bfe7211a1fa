//! Deterministic local responder for development and tests.

use super::{Responder, ResponderError};
use async_trait::async_trait;

/// Reply used when the input is empty or whitespace.
pub const EMPTY_INPUT_REPLY: &str = "I do not understand...";

/// Echoes the input back in a fixed template.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoResponder;

impl EchoResponder {
    /// The reply [`EchoResponder`] gives for `text`.
    pub fn reply_for(text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            EMPTY_INPUT_REPLY.to_string()
        } else {
            format!("You said: {}", trimmed)
        }
    }
}

#[async_trait]
impl Responder for EchoResponder {
    async fn generate_response(
        &self,
        text: &str,
        _request_id: Option<&str>,
    ) -> Result<String, ResponderError> {
        Ok(Self::reply_for(text))
    }

    async fn health_check(&self) -> Result<(), ResponderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}
