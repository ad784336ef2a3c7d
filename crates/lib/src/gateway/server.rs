//! Gateway HTTP server: health probe and webhook intake (single port).

use crate::channels::{RelayError, RelayRegistry};
use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state for the gateway (config and relay registry). Read-only once serving.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub registry: Arc<RelayRegistry>,
}

impl GatewayState {
    /// State with the relays enabled in `config`.
    pub fn new(config: Config) -> Self {
        let registry = RelayRegistry::from_config(&config);
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: Config, registry: RelayRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }
}

/// Why a transfer request was rejected. Rendered as a plain-text response.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Key is empty")]
    MissingCredential,
    #[error("Unsupported hook type({0})")]
    UnsupportedRoutingName(String),
    #[error("Read request body err: {0}")]
    BodyRead(#[from] BytesRejection),
    #[error("Convert and send err: {0}")]
    Relay(#[from] RelayError),
}

impl TransferError {
    fn status(&self) -> StatusCode {
        match self {
            TransferError::MissingCredential => StatusCode::BAD_REQUEST,
            TransferError::UnsupportedRoutingName(_) => StatusCode::NOT_FOUND,
            TransferError::BodyRead(_) | TransferError::Relay(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TransferError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Router with all gateway routes. Exposed so tests can serve it on their own listener.
/// Request bodies are unbounded unless `gateway.maxBodyBytes` is set.
pub fn router(state: GatewayState) -> Router {
    let body_limit = match state.config.gateway.max_body_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };
    Router::new()
        .route("/", get(health_http))
        .route("/transfer/:name", post(transfer))
        .layer(body_limit)
        .with_state(state)
}

pub async fn run_gateway(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::new(config);
    if state.registry.ids().is_empty() {
        log::warn!("no relay channels enabled; every transfer will be rejected");
    }
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// In-flight transfers finish before the server returns.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /transfer/:name?key=<token>: relays the body through the named channel.
async fn transfer(
    State(state): State<GatewayState>,
    Path(name): Path<String>,
    Query(mut query): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<&'static str, TransferError> {
    let result = relay_transfer(&state, &name, query.remove("key"), body).await;
    match &result {
        Ok(_) => log::info!("transfer {}: ok", name),
        Err(e) => log::warn!("transfer {}: {} {}", name, e.status().as_u16(), e),
    }
    result
}

async fn relay_transfer(
    state: &GatewayState,
    name: &str,
    key: Option<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<&'static str, TransferError> {
    let key = key
        .filter(|k| !k.trim().is_empty())
        .ok_or(TransferError::MissingCredential)?;
    let relay = state
        .registry
        .resolve(name)
        .ok_or_else(|| TransferError::UnsupportedRoutingName(name.to_string()))?;
    let body = body?;
    relay.convert_and_send(&body, &key).await?;
    Ok("Success")
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "channels": state.registry.ids(),
    }))
}
