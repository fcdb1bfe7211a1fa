//! Application startup and lifecycle management.
//!
//! The gateway is an explicitly constructed value: [`build_router`] wires the
//! routes around an [`AppState`], and [`Application`] owns the listener. Tests
//! build as many isolated instances as they need.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::REQUEST_ID_HEADER;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{ChatbotConfig, ResponderConfig, ResponderKind};
use crate::handlers::{
    chat::{index, predict},
    health::{health_check, readiness_check},
    metrics::metrics,
};
use crate::services::responders::{EchoResponder, HttpResponder, HttpResponderConfig, Responder};
use crate::services::{BootstrapOutcome, ResourceBootstrap};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<dyn Responder>,
}

impl AppState {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self { responder }
    }
}

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route_layer(from_fn(metrics_middleware))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the span above already sees the assigned id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Construct the responder selected by configuration.
pub fn build_responder(config: &ResponderConfig) -> Result<Arc<dyn Responder>, AppError> {
    let responder: Arc<dyn Responder> = match config.kind {
        ResponderKind::Http => {
            let responder = HttpResponder::new(HttpResponderConfig {
                url: config.url.clone(),
                health_url: config.health_url.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
            })?;
            tracing::info!(url = %responder.url(), "Initialized HTTP responder");
            Arc::new(responder)
        }
        ResponderKind::Echo => {
            tracing::info!("Initialized echo responder");
            Arc::new(EchoResponder::default())
        }
    };

    Ok(responder)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    static_dir: PathBuf,
}

impl Application {
    /// Build the application with the responder named in `config`.
    pub async fn build(config: ChatbotConfig) -> Result<Self, AppError> {
        let responder = build_responder(&config.responder)?;
        Self::build_with_responder(config, responder).await
    }

    /// Build the application around an already constructed responder.
    pub async fn build_with_responder(
        config: ChatbotConfig,
        responder: Arc<dyn Responder>,
    ) -> Result<Self, AppError> {
        let bootstrap = ResourceBootstrap::new(&config.resources);
        match bootstrap.ensure_ready().await {
            Ok(BootstrapOutcome::Downloaded { bytes }) => {
                tracing::info!(bytes, "Resource bundle installed");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to prepare resource bundle: {}", e);
                return Err(e.into());
            }
        }

        // port 0 = random port for testing
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            responder = responder.name(),
            "Chatbot service listening"
        );

        Ok(Self {
            port,
            listener,
            state: AppState::new(responder),
            static_dir: config.static_dir,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state, &self.static_dir);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
