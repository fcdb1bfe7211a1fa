use chatbot_service::config::ChatbotConfig;
use chatbot_service::services::metrics::init_metrics;
use chatbot_service::startup::Application;
use dotenvy::dotenv;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = ChatbotConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "chatbot-service",
        &config.observability.log_level,
        config.observability.otlp_endpoint.as_deref(),
    )?;

    init_metrics();

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start chatbot-service: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    app.run_until_stopped().await?;

    tracing::info!("chatbot-service stopped");
    Ok(())
}
