//! SyncHub: the real-time core.
//!
//! The hub owns the registry of connected real-time clients and implements
//! the three flows of the protocol:
//!
//! 1. **Initial push** — a client registered with [`SyncHub::register`] is
//!    immediately sent the current layout, so new screens never wait for the
//!    next edit to render.
//! 2. **Broadcast fan-out** — after a successful config write the REST
//!    gateway calls [`SyncHub::broadcast_layout`], which re-reads the store
//!    and sends a `layoutUpdated` to *every* client, including the editor.
//!    Reflecting the editor's own write through the same path as every other
//!    viewer is what guarantees all clients converge; do not "optimize" the
//!    self-delivery away.
//! 3. **Per-request dispatch** — `pressKey` is an action, not shared state:
//!    [`SyncHub::press_key`] runs the dispatcher and the result goes back to
//!    the requesting connection only.
//!
//! # No cached layout
//!
//! The hub never holds a layout in memory; every push re-reads from the
//! repository.  This sidesteps cache-coherence hazards entirely at the cost
//! of an accepted read-modify-write race between concurrent editors
//! (last write wins, no conflict detection).
//!
//! # Dead clients
//!
//! Each client is an unbounded sender into its session's writer task.
//! Sending to a closed channel is a no-op: the entry is pruned and nothing
//! else happens, because no per-client server-side state outlives the
//! connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;
use webdeck_core::ServerEvent;

use crate::application::persistence::LayoutRepository;
use crate::application::press_key::{DispatchError, KeyDispatcher, PressKeyUseCase};

/// Unique identifier for one real-time connection.
pub type ConnectionId = Uuid;

/// The connected-client registry and event router.
pub struct SyncHub {
    repo: Arc<dyn LayoutRepository>,
    press_key: PressKeyUseCase,
    dispatch_timeout: Duration,
    clients: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl SyncHub {
    /// Creates a hub over the given repository and key dispatcher.
    pub fn new(
        repo: Arc<dyn LayoutRepository>,
        dispatcher: Arc<dyn KeyDispatcher>,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            press_key: PressKeyUseCase::new(dispatcher),
            dispatch_timeout,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new client and immediately queues the current layout to it.
    pub async fn register(&self, tx: mpsc::UnboundedSender<ServerEvent>) -> ConnectionId {
        let id = Uuid::new_v4();
        // Push state before the client becomes visible to broadcasts so its
        // first frame is always a layoutUpdated.
        let _ = tx.send(self.layout_snapshot());
        self.clients.write().await.insert(id, tx);
        info!("client {id} connected");
        id
    }

    /// Removes a client.  There is no other per-client state to clean up.
    pub async fn unregister(&self, id: ConnectionId) {
        if self.clients.write().await.remove(&id).is_some() {
            info!("client {id} disconnected");
        }
    }

    /// Number of currently registered clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// The current layout as a `layoutUpdated` event (re-read from storage).
    pub fn layout_snapshot(&self) -> ServerEvent {
        ServerEvent::LayoutUpdated {
            layout: self.repo.load_or_default(),
        }
    }

    /// Sends the current layout to every registered client.
    ///
    /// Called by the REST gateway after each successful save; the re-read
    /// guarantees clients see exactly what was persisted.  Returns the number
    /// of clients the event was delivered to (dead entries are pruned).
    pub async fn broadcast_layout(&self) -> usize {
        let event = self.layout_snapshot();
        let mut clients = self.clients.write().await;
        clients.retain(|id, tx| {
            let alive = tx.send(event.clone()).is_ok();
            if !alive {
                debug!("pruning closed connection {id}");
            }
            alive
        });
        let delivered = clients.len();
        info!("layout broadcast to {delivered} client(s)");
        delivered
    }

    /// Dispatches a key press and returns the `keyResult` for the requester.
    ///
    /// The dispatcher is synchronous OS code, so it runs on the blocking pool
    /// and is bounded by the configured timeout: one stuck request must never
    /// stall layout synchronization for other connections.
    pub async fn press_key(&self, raw: &str) -> ServerEvent {
        let use_case = self.press_key.clone();
        let key = raw.to_string();
        let task = tokio::task::spawn_blocking({
            let key = key.clone();
            move || use_case.press(&key)
        });

        let outcome = match tokio::time::timeout(self.dispatch_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(DispatchError::Platform(format!(
                "dispatch task failed: {join_err}"
            ))),
            Err(_) => Err(DispatchError::Timeout(self.dispatch_timeout)),
        };

        match outcome {
            Ok(()) => {
                debug!("pressed key '{key}'");
                ServerEvent::KeyResult {
                    success: true,
                    key: key.clone(),
                    message: format!("key '{key}' pressed"),
                }
            }
            Err(e) => {
                warn!("key dispatch failed for '{key}': {e}");
                ServerEvent::KeyResult {
                    success: false,
                    key,
                    message: e.to_string(),
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::persistence::StorageError;
    use crate::infrastructure::input::mock::MockDispatcher;
    use crate::infrastructure::input::null::NullDispatcher;
    use std::sync::Mutex;
    use webdeck_core::{KeyToken, Layout, Modifier};

    /// In-memory repository fake: no file system, swappable contents.
    struct MemoryRepo {
        layout: Mutex<Layout>,
    }

    impl MemoryRepo {
        fn new() -> Self {
            Self {
                layout: Mutex::new(Layout::default_layout()),
            }
        }
    }

    impl LayoutRepository for MemoryRepo {
        fn load_or_default(&self) -> Layout {
            self.layout.lock().unwrap().clone()
        }

        fn save(&self, layout: &Layout) -> Result<(), StorageError> {
            *self.layout.lock().unwrap() = layout.clone();
            Ok(())
        }
    }

    fn make_hub() -> SyncHub {
        SyncHub::new(
            Arc::new(MemoryRepo::new()),
            Arc::new(MockDispatcher::new()),
            Duration::from_secs(1),
        )
    }

    fn expect_layout(event: &ServerEvent) -> &Layout {
        match event {
            ServerEvent::LayoutUpdated { layout } => layout,
            other => panic!("expected layoutUpdated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_pushes_current_layout_immediately() {
        // Arrange
        let hub = make_hub();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Act
        hub.register(tx).await;

        // Assert: first queued event is the full layout, before any edit
        let event = rx.try_recv().expect("initial push must be queued");
        assert_eq!(expect_layout(&event), &Layout::default_layout());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_client_including_writer() {
        // Arrange: three clients
        let hub = make_hub();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, mut rx) = mpsc::unbounded_channel();
            hub.register(tx).await;
            rx.try_recv().unwrap(); // drain the initial push
            receivers.push(rx);
        }

        // Act
        let delivered = hub.broadcast_layout().await;

        // Assert: exactly N deliveries, one per connection
        assert_eq!(delivered, 3);
        for rx in &mut receivers {
            let event = rx.try_recv().expect("each client must receive the broadcast");
            assert!(matches!(event, ServerEvent::LayoutUpdated { .. }));
        }
    }

    #[tokio::test]
    async fn test_broadcast_prunes_disconnected_clients() {
        // Arrange: one live client, one whose receiver is dropped
        let hub = make_hub();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        hub.register(tx_live).await;
        rx_live.try_recv().unwrap();

        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        hub.register(tx_dead).await;
        drop(rx_dead);

        // Act
        let delivered = hub.broadcast_layout().await;

        // Assert: the dead entry is gone, the live one was served
        assert_eq!(delivered, 1);
        assert_eq!(hub.client_count().await, 1);
        assert!(rx_live.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_press_key_result_is_not_broadcast() {
        // Arrange: a second connected client that must stay silent
        let hub = make_hub();
        let (tx_other, mut rx_other) = mpsc::unbounded_channel();
        hub.register(tx_other).await;
        rx_other.try_recv().unwrap();

        // Act: dispatch on behalf of some requester
        let result = hub.press_key("g").await;

        // Assert: requester gets a success result, the other client nothing
        assert!(matches!(
            result,
            ServerEvent::KeyResult { success: true, .. }
        ));
        assert!(rx_other.try_recv().is_err(), "keyResult must never fan out");
    }

    #[tokio::test]
    async fn test_press_key_echoes_the_requested_key() {
        let hub = make_hub();
        match hub.press_key("ctrl+c").await {
            ServerEvent::KeyResult { key, success, .. } => {
                assert_eq!(key, "ctrl+c");
                assert!(success);
            }
            other => panic!("expected keyResult, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_press_key_with_bad_spec_fails_without_closing_anything() {
        // Arrange
        let hub = make_hub();

        // Act
        let result = hub.press_key("banana").await;

        // Assert: failure is data, not an error path
        match result {
            ServerEvent::KeyResult {
                success, message, ..
            } => {
                assert!(!success);
                assert!(message.contains("banana"));
            }
            other => panic!("expected keyResult, got {other:?}"),
        }
    }

    /// Dispatcher whose key-down wedges longer than any test timeout, standing
    /// in for a stuck OS call.
    struct StuckDispatcher;

    impl KeyDispatcher for StuckDispatcher {
        fn key_down(&self, _key: KeyToken) -> Result<(), DispatchError> {
            std::thread::sleep(Duration::from_secs(5));
            Ok(())
        }

        fn key_up(&self, _key: KeyToken) -> Result<(), DispatchError> {
            Ok(())
        }

        fn modifier_down(&self, _modifier: Modifier) -> Result<(), DispatchError> {
            Ok(())
        }

        fn modifier_up(&self, _modifier: Modifier) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_press_key_times_out_into_failed_result() {
        // Arrange: a dispatcher that wedges for 5 s under a 100 ms bound
        let hub = SyncHub::new(
            Arc::new(MemoryRepo::new()),
            Arc::new(StuckDispatcher),
            Duration::from_millis(100),
        );

        // Act
        let result = hub.press_key("g").await;

        // Assert: the requester gets a failed result naming the timeout
        // instead of waiting out the stuck OS call
        match result {
            ServerEvent::KeyResult {
                success,
                key,
                message,
            } => {
                assert!(!success);
                assert_eq!(key, "g");
                assert!(message.contains("timed out"), "got message: {message}");
            }
            other => panic!("expected keyResult, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_press_key_with_null_backend_reports_unavailable() {
        // Arrange: the startup factory fell back to the null dispatcher
        let hub = SyncHub::new(
            Arc::new(MemoryRepo::new()),
            Arc::new(NullDispatcher),
            Duration::from_secs(1),
        );

        // Act
        let result = hub.press_key("g").await;

        // Assert
        match result {
            ServerEvent::KeyResult {
                success, message, ..
            } => {
                assert!(!success);
                assert!(message.contains("no key-simulation backend"));
            }
            other => panic!("expected keyResult, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unregister_removes_client() {
        let hub = make_hub();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await;
        assert_eq!(hub.client_count().await, 1);

        hub.unregister(id).await;
        assert_eq!(hub.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_after_save_carries_persisted_content() {
        // Arrange: rename ギア → Gear through the repository
        let repo = Arc::new(MemoryRepo::new());
        let hub = SyncHub::new(
            Arc::clone(&repo) as Arc<dyn LayoutRepository>,
            Arc::new(MockDispatcher::new()),
            Duration::from_secs(1),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await;
        rx.try_recv().unwrap();

        let mut renamed = Layout::default_layout();
        renamed.modes[0].buttons[0].name = "Gear".to_string();
        repo.save(&renamed).unwrap();

        // Act
        hub.broadcast_layout().await;

        // Assert: the viewer sees the rename without issuing its own GET
        let event = rx.try_recv().unwrap();
        assert_eq!(expect_layout(&event).modes[0].buttons[0].name, "Gear");
    }
}
