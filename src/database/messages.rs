use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use std::collections::HashMap;

use super::{MessageRepository, MongoDB, MESSAGES};
use crate::models::Message;
use crate::utils::AppError;

#[async_trait]
impl MessageRepository for MongoDB {
    async fn insert(&self, mut message: Message) -> Result<Message, AppError> {
        message.id = Some(ObjectId::new());
        self.collection::<Message>(MESSAGES)
            .insert_one(&message)
            .await?;
        Ok(message)
    }

    async fn conversation(&self, a: &ObjectId, b: &ObjectId) -> Result<Vec<Message>, AppError> {
        let filter = doc! {
            "$or": [
                { "senderId": a, "receiverId": b },
                { "senderId": b, "receiverId": a },
            ]
        };

        let cursor = self
            .collection::<Message>(MESSAGES)
            .find(filter)
            .sort(doc! { "createdAt": 1, "_id": 1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn unseen_counts(&self, receiver: &ObjectId) -> Result<HashMap<ObjectId, u64>, AppError> {
        let pipeline = vec![
            doc! { "$match": { "receiverId": receiver, "seen": false } },
            doc! { "$group": { "_id": "$senderId", "count": { "$sum": 1 } } },
        ];

        let mut cursor = self
            .collection::<Message>(MESSAGES)
            .aggregate(pipeline)
            .await?;

        let mut counts = HashMap::new();
        while let Some(group) = cursor.try_next().await? {
            let sender = match group.get_object_id("_id") {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("⚠️  Skipping unseen group without sender id: {}", e);
                    continue;
                }
            };
            let count = match group.get("count") {
                Some(Bson::Int32(n)) => *n as u64,
                Some(Bson::Int64(n)) => *n as u64,
                _ => 0,
            };
            if count > 0 {
                counts.insert(sender, count);
            }
        }

        Ok(counts)
    }

    async fn mark_seen(&self, id: &ObjectId, receiver: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection::<Message>(MESSAGES)
            .update_one(
                doc! { "_id": id, "receiverId": receiver },
                doc! { "$set": { "seen": true, "updatedAt": Utc::now().timestamp_millis() } },
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn mark_conversation_seen(
        &self,
        sender: &ObjectId,
        receiver: &ObjectId,
    ) -> Result<u64, AppError> {
        let result = self
            .collection::<Message>(MESSAGES)
            .update_many(
                doc! { "senderId": sender, "receiverId": receiver, "seen": false },
                doc! { "$set": { "seen": true, "updatedAt": Utc::now().timestamp_millis() } },
            )
            .await?;

        Ok(result.modified_count)
    }
}
