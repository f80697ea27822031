//! REST gateway: the `/api/config` read/replace endpoint.
//!
//! Layout edits are request/response shaped, so they ride plain HTTP while
//! the push-shaped traffic (layout fan-out, key presses) rides the WebSocket
//! listener.  The two meet in the `SyncHub`: a successful POST here triggers
//! a `layoutUpdated` broadcast to every connected real-time client.
//!
//! # Replace semantics
//!
//! POST replaces the whole document.  There is no merge and no conflict
//! detection; with two concurrent editors the last write wins.  The ordering
//! contract is validate → persist → broadcast, so a layout that fails either
//! step is never pushed to viewers and the previous document stays live.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use webdeck_core::Layout;

use crate::application::persistence::LayoutRepository;
use crate::application::sync_hub::SyncHub;

/// Shared state for the REST handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub hub: Arc<SyncHub>,
    pub repo: Arc<dyn LayoutRepository>,
}

/// Response body for POST `/api/config`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

/// Builds the REST router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/config", get(get_config).post(post_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET `/api/config` — the current layout document.
///
/// Loading is fail-open, so this always answers 200 with a renderable
/// layout even when the file on disk is missing or broken.
async fn get_config(State(state): State<GatewayState>) -> Json<Layout> {
    Json(state.repo.load_or_default())
}

/// POST `/api/config` — replace the layout document.
///
/// Validate → persist → broadcast.  The broadcast includes the editor's own
/// connection, which is how the editing screen confirms its write landed.
async fn post_config(
    State(state): State<GatewayState>,
    Json(layout): Json<Layout>,
) -> impl IntoResponse {
    if let Err(e) = layout.validate() {
        warn!("rejected layout update: {e}");
        return (
            StatusCode::BAD_REQUEST,
            Json(SaveResponse {
                success: false,
                message: e.to_string(),
            }),
        );
    }

    if let Err(e) = state.repo.save(&layout) {
        warn!("failed to persist layout: {e}");
        // Nothing is broadcast: viewers keep the document that is actually
        // on disk.
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SaveResponse {
                success: false,
                message: e.to_string(),
            }),
        );
    }

    let delivered = state.hub.broadcast_layout().await;
    info!("layout replaced; broadcast to {delivered} client(s)");

    (
        StatusCode::OK,
        Json(SaveResponse {
            success: true,
            message: "layout saved".to_string(),
        }),
    )
}

/// Runs the HTTP server until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_rest_server(
    bind_addr: std::net::SocketAddr,
    state: GatewayState,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {bind_addr}"))?;

    info!("HTTP gateway listening on {bind_addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            // Poll the shared flag; it is set by the Ctrl+C handler.
            while running.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            info!("shutdown flag set; stopping HTTP gateway");
        })
        .await
        .context("HTTP gateway failed")?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
