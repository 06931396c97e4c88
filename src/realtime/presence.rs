use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

use super::events::ServerEvent;

/// Push channel to one live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connection_id: Uuid,
    sender: UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    /// Creates a handle with a fresh connection id and the receiving end the
    /// connection drains.
    pub fn open() -> (Self, UnboundedReceiver<ServerEvent>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                connection_id: Uuid::new_v4(),
                sender,
            },
            receiver,
        )
    }

    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Non-blocking push. Returns false when the connection is gone.
    pub fn push(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Answers "is user X reachable, and through which handle".
///
/// The fan-out only talks to this trait, so a shared registry can replace the
/// local map when running more than one instance.
#[async_trait]
pub trait PresenceRegistry: Send + Sync {
    /// Records `handle` for `user_id`, replacing any previous one (last
    /// connection wins). Returns the replaced handle.
    async fn connect(&self, user_id: &str, handle: ConnectionHandle) -> Option<ConnectionHandle>;

    /// Removes the entry for `user_id` if it still belongs to `connection_id`.
    async fn disconnect(&self, user_id: &str, connection_id: Uuid) -> bool;

    async fn lookup(&self, user_id: &str) -> Option<ConnectionHandle>;

    /// Sorted ids of every user with a registered connection.
    async fn list_online(&self) -> Vec<String>;
}

/// Single-process presence map behind one lock.
#[derive(Default)]
pub struct LocalPresence {
    entries: RwLock<HashMap<String, ConnectionHandle>>,
}

impl LocalPresence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceRegistry for LocalPresence {
    async fn connect(&self, user_id: &str, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let mut entries = self.entries.write().await;
        let replaced = entries.insert(user_id.to_string(), handle);

        if let Some(old) = &replaced {
            log::debug!(
                "🔁 User {} reconnected, connection {} superseded",
                user_id,
                old.connection_id
            );
        }

        replaced
    }

    async fn disconnect(&self, user_id: &str, connection_id: Uuid) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(user_id) {
            Some(current) if current.connection_id == connection_id => {
                entries.remove(user_id);
                true
            }
            Some(_) => {
                log::debug!(
                    "ℹ️  Connection {} of user {} already superseded, entry kept",
                    connection_id,
                    user_id
                );
                false
            }
            None => false,
        }
    }

    async fn lookup(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.entries.read().await.get(user_id).cloned()
    }

    async fn list_online(&self) -> Vec<String> {
        let mut online: Vec<String> = self.entries.read().await.keys().cloned().collect();
        online.sort();
        online
    }
}
