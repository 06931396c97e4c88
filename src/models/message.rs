use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::user::millis_to_datetime;

/// Mensagem armazenada no MongoDB (coleção `messages`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub sender_id: ObjectId,

    pub receiver_id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Hosted image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub seen: bool,

    /// Unix timestamp (ms)
    pub created_at: i64,

    pub updated_at: i64,
}

impl Message {
    pub fn new(sender_id: ObjectId, receiver_id: ObjectId, text: Option<String>, image: Option<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        Message {
            id: None,
            sender_id,
            receiver_id,
            text,
            image,
            seen: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request para enviar mensagem
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct SendMessageRequest {
    pub text: Option<String>,
    /// Base64 data URI, uploaded before the message is stored
    pub image: Option<String>,
}

/// Message as sent over HTTP and the realtime channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        MessageResponse {
            id: message.id.map(|id| id.to_hex()).unwrap_or_default(),
            sender_id: message.sender_id.to_hex(),
            receiver_id: message.receiver_id.to_hex(),
            text: message.text,
            image: message.image,
            seen: message.seen,
            created_at: millis_to_datetime(message.created_at),
            updated_at: millis_to_datetime(message.updated_at),
        }
    }
}
