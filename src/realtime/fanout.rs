use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use super::events::ServerEvent;
use super::presence::{ConnectionHandle, PresenceRegistry};
use crate::models::MessageResponse;

/// Capacity of the online-list broadcast. A lagging connection skips stale
/// lists, which is harmless since every list supersedes the previous one.
const BROADCAST_CAPACITY: usize = 256;

/// Outcome of pushing a message to its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the receiver's current connection.
    Pushed,
    /// Receiver has no registered connection. The message waits in history.
    Offline,
    /// Receiver was registered but the connection had already gone away.
    Dropped,
}

/// Delivers persisted messages and presence changes to live connections.
#[derive(Clone)]
pub struct Fanout {
    presence: Arc<dyn PresenceRegistry>,
    broadcast_tx: broadcast::Sender<ServerEvent>,
    // Held across registry update, snapshot and send so lists go out in order
    presence_changes: Arc<Mutex<()>>,
}

impl Fanout {
    pub fn new(presence: Arc<dyn PresenceRegistry>) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            presence,
            broadcast_tx,
            presence_changes: Arc::new(Mutex::new(())),
        }
    }

    /// Receiver for events sent to every open connection.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Registers the connection and tells everyone who is online.
    pub async fn connect(&self, user_id: &str, handle: ConnectionHandle) {
        log::info!(
            "🟢 User connected: {} (connection {})",
            user_id,
            handle.connection_id()
        );
        let _guard = self.presence_changes.lock().await;
        self.presence.connect(user_id, handle).await;
        self.broadcast_online().await;
    }

    /// Unregisters the connection (if still current) and tells everyone who is online.
    pub async fn disconnect(&self, user_id: &str, connection_id: Uuid) {
        log::info!(
            "🔴 User disconnected: {} (connection {})",
            user_id,
            connection_id
        );
        let _guard = self.presence_changes.lock().await;
        self.presence.disconnect(user_id, connection_id).await;
        self.broadcast_online().await;
    }

    pub async fn online_users(&self) -> Vec<String> {
        self.presence.list_online().await
    }

    // Caller holds `presence_changes`
    async fn broadcast_online(&self) {
        let online = self.presence.list_online().await;
        log::debug!("📡 Broadcasting {} online users", online.len());

        // Err only means nobody is subscribed
        let _ = self.broadcast_tx.send(ServerEvent::GetOnlineUsers(online));
    }

    /// Pushes a persisted message to the receiver's connection, if any.
    /// At most once; nothing is queued or retried.
    pub async fn deliver(&self, message: &MessageResponse) -> Delivery {
        let Some(handle) = self.presence.lookup(&message.receiver_id).await else {
            log::debug!(
                "📭 Receiver {} offline, message {} left in history",
                message.receiver_id,
                message.id
            );
            return Delivery::Offline;
        };

        if handle.push(ServerEvent::NewMessage(message.clone())) {
            log::debug!(
                "📨 Message {} pushed to {} (connection {})",
                message.id,
                message.receiver_id,
                handle.connection_id()
            );
            Delivery::Pushed
        } else {
            log::debug!(
                "🗑️  Stale connection {} for {}, push dropped",
                handle.connection_id(),
                message.receiver_id
            );
            Delivery::Dropped
        }
    }
}
