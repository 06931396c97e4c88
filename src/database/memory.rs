//! In-process repositories for tests.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{MessageRepository, UserRepository};
use crate::models::{Message, ProfileUpdate, User};
use crate::utils::AppError;

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<Vec<User>>,
    messages: Mutex<Vec<Message>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Account already exists".to_string()));
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        update: ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id.as_ref() == Some(id)) else {
            return Ok(None);
        };
        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }
        if let Some(bio) = update.bio {
            user.bio = bio;
        }
        if let Some(profile_pic) = update.profile_pic {
            user.profile_pic = profile_pic;
        }
        user.updated_at = Utc::now().timestamp_millis();
        Ok(Some(user.clone()))
    }

    async fn list_except(&self, id: &ObjectId) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.id.as_ref() != Some(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn insert(&self, mut message: Message) -> Result<Message, AppError> {
        message.id = Some(ObjectId::new());
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn conversation(&self, a: &ObjectId, b: &ObjectId) -> Result<Vec<Message>, AppError> {
        let messages = self.messages.lock().unwrap();
        let mut found: Vec<Message> = messages
            .iter()
            .filter(|m| {
                (m.sender_id == *a && m.receiver_id == *b)
                    || (m.sender_id == *b && m.receiver_id == *a)
            })
            .cloned()
            .collect();
        found.sort_by_key(|m| (m.created_at, m.id));
        Ok(found)
    }

    async fn unseen_counts(&self, receiver: &ObjectId) -> Result<HashMap<ObjectId, u64>, AppError> {
        let messages = self.messages.lock().unwrap();
        let mut counts = HashMap::new();
        for m in messages.iter().filter(|m| m.receiver_id == *receiver && !m.seen) {
            *counts.entry(m.sender_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn mark_seen(&self, id: &ObjectId, receiver: &ObjectId) -> Result<bool, AppError> {
        let mut messages = self.messages.lock().unwrap();
        match messages
            .iter_mut()
            .find(|m| m.id.as_ref() == Some(id) && m.receiver_id == *receiver)
        {
            Some(m) => {
                m.seen = true;
                m.updated_at = Utc::now().timestamp_millis();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_conversation_seen(
        &self,
        sender: &ObjectId,
        receiver: &ObjectId,
    ) -> Result<u64, AppError> {
        let mut messages = self.messages.lock().unwrap();
        let now = Utc::now().timestamp_millis();
        let mut changed = 0;
        for m in messages
            .iter_mut()
            .filter(|m| m.sender_id == *sender && m.receiver_id == *receiver && !m.seen)
        {
            m.seen = true;
            m.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_conversation_seen_touches_updated_at() {
        let store = InMemoryStore::new();
        let (alice, bob) = (ObjectId::new(), ObjectId::new());

        let mut message = Message::new(alice, bob, Some("hi".to_string()), None);
        message.updated_at = 0;
        MessageRepository::insert(&store, message).await.unwrap();

        assert_eq!(store.mark_conversation_seen(&alice, &bob).await.unwrap(), 1);
        assert_eq!(store.mark_conversation_seen(&alice, &bob).await.unwrap(), 0);

        let stored = store.conversation(&alice, &bob).await.unwrap();
        assert!(stored[0].seen);
        assert!(stored[0].updated_at > 0);
    }
}
