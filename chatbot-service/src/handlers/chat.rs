use askama::Template;
use axum::{extract::State, response::Html, Extension, Json};
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use service_core::utils::TypedJson;
use std::time::Instant;

use crate::models::{ChatMessage, ChatResponse};
use crate::services::metrics;
use crate::startup::AppState;

#[derive(Template)]
#[template(path = "base.html")]
pub struct ChatPageTemplate {
    pub title: &'static str,
}

/// `GET /`: the chat page.
pub async fn index() -> Result<Html<String>, AppError> {
    let page = ChatPageTemplate { title: "Chatbot" }
        .render()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to render page: {}", e)))?;

    Ok(Html(page))
}

/// `POST /predict`: forward the message to the responder and wrap its reply.
pub async fn predict(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    TypedJson(payload): TypedJson<ChatMessage>,
) -> Result<Json<ChatResponse>, AppError> {
    let responder = state.responder.name();
    let request_id = request_id.map(|Extension(id)| id);

    let start = Instant::now();
    let result = state
        .responder
        .generate_response(
            &payload.message,
            request_id.as_ref().map(RequestId::as_str),
        )
        .await;
    metrics::record_responder_latency(responder, start.elapsed().as_secs_f64());

    match result {
        Ok(answer) => {
            metrics::record_prediction(responder, "ok");
            tracing::debug!(
                responder,
                message_len = payload.message.len(),
                answer_len = answer.len(),
                "Prediction served"
            );
            Ok(Json(ChatResponse::new(answer)))
        }
        Err(e) => {
            metrics::record_prediction(responder, e.kind());
            tracing::error!(responder, error = %e, "Responder failed");
            Err(e.into())
        }
    }
}
