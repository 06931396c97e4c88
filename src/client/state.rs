use std::collections::{HashMap, HashSet};

use crate::models::{MessageResponse, UserResponse};
use crate::realtime::ServerEvent;

/// Follow-up the caller has to perform against the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Issue `PUT /api/messages/mark/{id}`.
    MarkSeen(String),
    None,
}

/// Sidebar, open conversation and presence as seen by one logged-in user.
#[derive(Debug, Default)]
pub struct ChatState {
    users: Vec<UserResponse>,
    unseen: HashMap<String, u64>,
    online: HashSet<String>,
    selected: Option<String>,
    messages: Vec<MessageResponse>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the sidebar with a fresh `GET /api/messages/users` result.
    pub fn load_users(&mut self, users: Vec<UserResponse>, unseen: HashMap<String, u64>) {
        self.users = users;
        self.unseen = unseen.into_iter().filter(|(_, n)| *n > 0).collect();

        // Conversa aberta não acumula contador
        if let Some(selected) = &self.selected {
            self.unseen.remove(selected);
        }
    }

    /// Opens the conversation with `user_id` and clears its unseen counter.
    pub fn select_user(&mut self, user_id: &str) {
        if self.selected.as_deref() != Some(user_id) {
            self.messages.clear();
        }
        self.selected = Some(user_id.to_string());
        self.unseen.remove(user_id);
    }

    /// Replaces the visible list with a fetched history.
    pub fn load_history(&mut self, messages: Vec<MessageResponse>) {
        self.messages = messages;
    }

    pub fn append_sent(&mut self, message: MessageResponse) {
        self.messages.push(message);
    }

    pub fn handle_event(&mut self, event: ServerEvent) -> ClientAction {
        match event {
            ServerEvent::GetOnlineUsers(ids) => {
                self.online = ids.into_iter().collect();
                ClientAction::None
            }
            ServerEvent::NewMessage(mut message) => {
                if self.selected.as_deref() == Some(message.sender_id.as_str()) {
                    message.seen = true;
                    let id = message.id.clone();
                    self.messages.push(message);
                    ClientAction::MarkSeen(id)
                } else {
                    *self.unseen.entry(message.sender_id).or_insert(0) += 1;
                    ClientAction::None
                }
            }
        }
    }

    /// Parses a realtime text frame and applies it.
    pub fn handle_frame(&mut self, frame: &str) -> Result<ClientAction, serde_json::Error> {
        let event: ServerEvent = serde_json::from_str(frame)?;
        Ok(self.handle_event(event))
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online.contains(user_id)
    }

    pub fn unseen_for(&self, user_id: &str) -> u64 {
        self.unseen.get(user_id).copied().unwrap_or(0)
    }

    pub fn messages(&self) -> &[MessageResponse] {
        &self.messages
    }

    pub fn users(&self) -> &[UserResponse] {
        &self.users
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}
