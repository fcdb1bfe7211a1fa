use serde::{Deserialize, Serialize};

/// Body of `POST /predict`.
///
/// `message` is required: a missing or `null` field fails decoding. The
/// empty string is accepted and handed to the responder as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
}

/// Reply envelope for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

impl ChatResponse {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}
