//! WebDeck server — entry point.
//!
//! This binary turns any browser on the LAN into a programmable keypad for
//! this machine.  It serves the shared button layout over HTTP, keeps every
//! connected browser in sync over WebSocket, and synthesizes the configured
//! keystrokes on the host when a button is pressed.
//!
//! # Usage
//!
//! ```text
//! webdeck-server [OPTIONS]
//!
//! Options:
//!   --http-port        <PORT>  HTTP (REST) listener port [default: 8700]
//!   --ws-port          <PORT>  WebSocket listener port [default: 8701]
//!   --bind             <ADDR>  Bind address for both listeners [default: 0.0.0.0]
//!   --layout-file      <PATH>  Layout JSON file [default: config.json]
//!   --dispatch-timeout <SECS>  Key dispatch timeout in seconds [default: 5]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                   | Default       | Description                |
//! |----------------------------|---------------|----------------------------|
//! | `WEBDECK_HTTP_PORT`        | `8700`        | REST listener port         |
//! | `WEBDECK_WS_PORT`          | `8701`        | WebSocket listener port    |
//! | `WEBDECK_BIND`             | `0.0.0.0`     | Bind address               |
//! | `WEBDECK_LAYOUT_FILE`      | `config.json` | Layout JSON file           |
//! | `WEBDECK_DISPATCH_TIMEOUT` | `5`           | Key dispatch timeout (s)   |
//!
//! # Architecture overview
//!
//! ```text
//! Browser  (REST: GET/POST /api/config)      Browser  (WebSocket: JSON events)
//!       ↕                                          ↕
//! webdeck-server  ← this process
//!   application/      SyncHub, PressKeyUseCase, repository + dispatcher traits
//!   infrastructure/
//!     gateway/        REST router (axum), WebSocket accept loop
//!     storage/        layout JSON file (atomic writes)
//!     input/          per-OS key-simulation backends
//!       ↕
//! Host OS input queue  (XTest / SendInput / CGEvent)
//! ```

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webdeck_server::application::SyncHub;
use webdeck_server::infrastructure::gateway::rest::{run_rest_server, GatewayState};
use webdeck_server::infrastructure::{select_dispatcher, LayoutStore, RealtimeServer};
use webdeck_server::ServerConfig;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// WebDeck server.
///
/// Serves a shared button layout to browsers and presses the configured keys
/// on this machine when a button is tapped.
#[derive(Debug, Parser)]
#[command(
    name = "webdeck-server",
    about = "Browser-operated remote keypad for the host machine",
    version
)]
struct Cli {
    /// TCP port for the HTTP (REST) listener.
    ///
    /// Browsers read and replace the layout via `GET`/`POST /api/config` on
    /// this port.
    #[arg(long, default_value_t = 8700, env = "WEBDECK_HTTP_PORT")]
    http_port: u16,

    /// TCP port for the WebSocket listener.
    ///
    /// Browsers connect here (ws://host:PORT) for live layout sync and key
    /// presses.
    #[arg(long, default_value_t = 8701, env = "WEBDECK_WS_PORT")]
    ws_port: u16,

    /// IP address to bind both listeners to.
    ///
    /// Use `0.0.0.0` to accept connections from any interface (LAN +
    /// localhost), or `127.0.0.1` to accept only local connections.
    #[arg(long, default_value = "0.0.0.0", env = "WEBDECK_BIND")]
    bind: String,

    /// Path of the layout JSON file.
    ///
    /// Created on first save; until then the built-in default layout is
    /// served.
    #[arg(long, default_value = "config.json", env = "WEBDECK_LAYOUT_FILE")]
    layout_file: String,

    /// Key dispatch timeout in seconds.
    ///
    /// A press that does not complete within this bound comes back as a
    /// failed `keyResult` instead of stalling the connection.
    #[arg(long, default_value_t = 5, env = "WEBDECK_DISPATCH_TIMEOUT")]
    dispatch_timeout: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let http_bind_addr: SocketAddr = format!("{}:{}", self.bind, self.http_port)
            .parse()
            .with_context(|| format!("invalid HTTP bind address: '{}:{}'", self.bind, self.http_port))?;

        let ws_bind_addr: SocketAddr = format!("{}:{}", self.bind, self.ws_port)
            .parse()
            .with_context(|| format!("invalid WebSocket bind address: '{}:{}'", self.bind, self.ws_port))?;

        Ok(ServerConfig {
            http_bind_addr,
            ws_bind_addr,
            layout_path: self.layout_file.into(),
            dispatch_timeout: Duration::from_secs(self.dispatch_timeout),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log level comes from RUST_LOG; default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_server_config()?;

    info!(
        "WebDeck server starting — http={}, ws={}, layout={}",
        config.http_bind_addr,
        config.ws_bind_addr,
        config.layout_path.display()
    );

    // ── Wiring ────────────────────────────────────────────────────────────────
    //
    // One repository and one hub are shared by both gateways: a POST on the
    // REST side broadcasts through the same hub the WebSocket sessions are
    // registered with.
    let repo = Arc::new(LayoutStore::new(config.layout_path.clone()));
    let dispatcher = select_dispatcher();
    let hub = Arc::new(SyncHub::new(
        Arc::clone(&repo) as _,
        dispatcher,
        config.dispatch_timeout,
    ));
    let state = GatewayState {
        hub: Arc::clone(&hub),
        repo: repo as _,
    };

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    //
    // Both accept loops check this flag every 200 ms and exit cleanly when it
    // is cleared by the Ctrl+C handler.
    let running = Arc::new(AtomicBool::new(true));
    let running_signal = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_signal.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Run both gateways ─────────────────────────────────────────────────────
    let realtime = RealtimeServer::bind(config.ws_bind_addr, hub).await?;

    tokio::try_join!(
        run_rest_server(config.http_bind_addr, state, Arc::clone(&running)),
        realtime.run(running),
    )?;

    info!("WebDeck server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
