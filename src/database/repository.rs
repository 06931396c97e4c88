use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

use crate::models::{Message, ProfileUpdate, User};
use crate::utils::AppError;

/// Persistence for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    /// Stores a new user and returns it with its id assigned.
    /// Fails with `Conflict` when the email is taken.
    async fn insert(&self, user: User) -> Result<User, AppError>;

    /// Applies the non-empty fields of `update` and returns the updated record.
    async fn update_profile(
        &self,
        id: &ObjectId,
        update: ProfileUpdate,
    ) -> Result<Option<User>, AppError>;

    /// Every user except `id`.
    async fn list_except(&self, id: &ObjectId) -> Result<Vec<User>, AppError>;
}

/// Persistence for message records.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: Message) -> Result<Message, AppError>;

    /// Both directions between `a` and `b`, oldest first.
    async fn conversation(&self, a: &ObjectId, b: &ObjectId) -> Result<Vec<Message>, AppError>;

    /// Unseen message count per sender for messages addressed to `receiver`.
    /// Senders with nothing unseen are absent.
    async fn unseen_counts(&self, receiver: &ObjectId) -> Result<HashMap<ObjectId, u64>, AppError>;

    /// Sets `seen` on one message addressed to `receiver`.
    /// Returns false when no such message exists.
    async fn mark_seen(&self, id: &ObjectId, receiver: &ObjectId) -> Result<bool, AppError>;

    /// Sets `seen` on everything `sender` sent to `receiver`. Returns the number changed.
    async fn mark_conversation_seen(
        &self,
        sender: &ObjectId,
        receiver: &ObjectId,
    ) -> Result<u64, AppError>;
}
