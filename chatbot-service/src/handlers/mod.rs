//! HTTP handlers for the chatbot gateway.

pub mod chat;
pub mod health;
pub mod metrics;
