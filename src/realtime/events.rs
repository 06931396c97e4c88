use serde::{Deserialize, Serialize};

use crate::models::MessageResponse;

/// Frames pushed from the server over the realtime channel.
///
/// Serialized as `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A freshly persisted message addressed to the connection's user.
    #[serde(rename = "newMessage")]
    NewMessage(MessageResponse),

    /// Ids of every user with a registered connection.
    #[serde(rename = "getOnlineUsers")]
    GetOnlineUsers(Vec<String>),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::NewMessage(_) => "newMessage",
            ServerEvent::GetOnlineUsers(_) => "getOnlineUsers",
        }
    }
}
