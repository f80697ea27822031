//! Real-time gateway: WebSocket accept loop and per-session tasks.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming connections from browsers and upgrading each to a
//!    WebSocket session.
//! 3. Registering the session with the `SyncHub` (which immediately queues
//!    the current layout as the session's first frame).
//! 4. Running two halves per session:
//!    - **Writer task**: drains the session's event channel and writes each
//!      `ServerEvent` to the socket as a JSON text frame.  Broadcasts from
//!      the hub and per-request replies share this one path, so frames from
//!      one connection are never interleaved mid-message.
//!    - **Read loop**: parses incoming `ClientEvent` frames and routes them
//!      to the hub.  A malformed frame earns an `error` event and the
//!      session continues — one bad message never costs a viewer its
//!      layout subscription.
//! 5. Unregistering from the hub when the session ends, however it ends.
//!
//! # Scalability
//!
//! Each session runs in its own Tokio task; the accept loop never blocks on
//! session I/O.  The accept call uses a short timeout so the loop can
//! periodically check the shared shutdown flag even when nothing is
//! connecting.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use webdeck_core::{ClientEvent, ServerEvent};

use crate::application::sync_hub::SyncHub;

// ── Public API ────────────────────────────────────────────────────────────────

/// The WebSocket listener for layout sync and key dispatch.
pub struct RealtimeServer {
    listener: TcpListener,
    hub: Arc<SyncHub>,
}

impl RealtimeServer {
    /// Binds the listener.  Binding is separate from running so callers
    /// (including tests) can learn the bound port before any client connects.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(bind_addr: SocketAddr, hub: Arc<SyncHub>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind WebSocket listener on {bind_addr}"))?;
        info!("realtime gateway listening on {}", listener.local_addr()?);
        Ok(Self { listener, hub })
    }

    /// The locally bound address (useful when binding port 0).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until `running` is cleared.
    ///
    /// Each accepted connection is handed to a dedicated Tokio task so one
    /// slow client never delays the next accept.
    pub async fn run(self, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping realtime accept loop");
                break;
            }

            // Short timeout so the loop can re-check the shutdown flag even
            // when no clients are connecting.
            match timeout(Duration::from_millis(200), self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    debug!("new realtime connection from {peer_addr}");
                    let hub = Arc::clone(&self.hub);
                    tokio::spawn(async move {
                        handle_session(stream, peer_addr, hub).await;
                    });
                }
                Ok(Err(e)) => {
                    // Transient accept error (e.g., out of file descriptors).
                    // Log and keep accepting rather than taking the gateway down.
                    error!("accept error: {e}");
                }
                Err(_) => {
                    // Timeout — loop back to check the flag.
                }
            }
        }

        Ok(())
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// Entry point for each per-session task.  Wraps [`run_session`] so the inner
/// function can use `?` while the outcome is logged in one place.
async fn handle_session(raw_stream: TcpStream, peer_addr: SocketAddr, hub: Arc<SyncHub>) {
    match run_session(raw_stream, peer_addr, hub).await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of one WebSocket session.
async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    hub: Arc<SyncHub>,
) -> anyhow::Result<()> {
    // Complete the WebSocket upgrade handshake; after this the stream speaks
    // frames instead of HTTP.
    let ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    // All server→client traffic (hub broadcasts, per-request replies, error
    // frames) funnels through one channel into one writer task, so frames are
    // serialized per connection without a sink mutex.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let connection_id = hub.register(tx.clone()).await;

    let writer_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!("session {peer_addr}: serialization error: {e}");
                    continue;
                }
            };
            if ws_tx.send(WsMessage::Text(json)).await.is_err() {
                debug!("session {peer_addr}: send failed (client disconnected)");
                break;
            }
        }
        // Drain ended: either the session read loop finished or the socket
        // died.  Attempt a clean close either way.
        let _ = ws_tx.close().await;
    });

    // Read loop: route client events until the socket closes.
    loop {
        let ws_msg = match ws_rx.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {peer_addr}: closed normally");
                break;
            }
            Some(Err(e)) => {
                warn!("session {peer_addr}: WebSocket error: {e}");
                break;
            }
            None => {
                debug!("session {peer_addr}: stream ended");
                break;
            }
        };

        match ws_msg {
            WsMessage::Text(json) => {
                let event: ClientEvent = match serde_json::from_str(&json) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("session {peer_addr}: invalid frame: {e}");
                        // One bad message must not cost the client its layout
                        // subscription; reply with an error frame and move on.
                        let _ = tx.send(ServerEvent::Error {
                            message: format!("invalid message: {e}"),
                        });
                        continue;
                    }
                };

                match event {
                    ClientEvent::RequestLayout => {
                        debug!("session {peer_addr}: layout requested");
                        let _ = tx.send(hub.layout_snapshot());
                    }
                    ClientEvent::PressKey { key } => {
                        debug!("session {peer_addr}: pressKey '{key}'");
                        // The result goes back to this connection only.
                        let result = hub.press_key(&key).await;
                        let _ = tx.send(result);
                    }
                }
            }

            WsMessage::Binary(_) => {
                // The protocol is JSON text frames only.
                warn!("session {peer_addr}: unexpected binary frame (ignored)");
            }

            WsMessage::Ping(_) | WsMessage::Pong(_) => {
                // Protocol-level keepalive; tungstenite answers pings when the
                // sink is written to.
            }

            WsMessage::Close(_) => {
                debug!("session {peer_addr}: close frame received");
                break;
            }

            WsMessage::Frame(_) => {
                debug!("session {peer_addr}: raw frame (ignored)");
            }
        }
    }

    // Deregister first so broadcasts stop targeting this connection, then
    // close the channel so the writer task drains and exits.
    hub.unregister(connection_id).await;
    drop(tx);
    let _ = writer_task.await;

    Ok(())
}
