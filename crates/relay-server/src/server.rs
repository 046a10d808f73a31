//! HTTP listener and top-level server wiring.
//!
//! This module:
//! - Builds the axum app: the WebSocket endpoint under `SOCKET_PATH`,
//!   a `/health` route, and the CORS layer.
//! - Rejects upgrades from disallowed origins and beyond `max_clients`.
//! - Binds the listener and serves until Ctrl-C.
//!
//! Per-connection logic lives in `client`.

use std::future::Future;

use anyhow::Context;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use relay_core::RouterStats;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::client;
use crate::config::{is_allowed_origin, Config, ALLOWED_ORIGINS, SOCKET_PATH};
use crate::types::AppState;

/// Build the axum application for the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(SOCKET_PATH, get(ws_handler))
        .route("/health", get(health))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .map(|&origin| HeaderValue::from_static(origin))
        .collect();

    // Credentials rule out wildcard headers, so echo whatever was requested.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    // Producers connect without an Origin header; browsers always send one.
    if let Some(origin) = headers.get(header::ORIGIN) {
        let allowed = origin.to_str().map(is_allowed_origin).unwrap_or(false);
        if !allowed {
            warn!(origin = ?origin, "rejecting connection from disallowed origin");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let current = state.registry.len();
    if current >= state.config.max_clients {
        warn!(
            sessions = current,
            max_clients = state.config.max_clients,
            "rejecting connection: max_clients reached"
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    ws.on_upgrade(move |socket| client::run_client(socket, state))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    sessions: usize,
    routed: RouterStats,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        sessions: state.registry.len(),
        routed: state.router.stats(),
    })
}

/// Run the relay with the given configuration until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, path = SOCKET_PATH, "listening");

    serve(listener, AppState::new(config), shutdown_signal()).await
}

/// Serve `state` on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
