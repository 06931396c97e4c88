use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{AuthUser, Message, MessageResponse, SendMessageRequest, UserResponse};
use crate::realtime::Delivery;
use crate::state::AppState;
use crate::utils::AppError;

/// Sidebar payload: everyone else plus unseen counts keyed by sender id.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SidebarResponse {
    pub success: bool,
    pub users: Vec<UserResponse>,
    pub unseen_messages: HashMap<String, u64>,
}

fn parse_id(raw: &str, what: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid {} id", what)))
}

/// Users for the sidebar with their unseen counters.
pub async fn users_for_sidebar(state: &AppState, me: &AuthUser) -> Result<SidebarResponse, AppError> {
    let users = state.users.list_except(&me.id).await?;
    let counts = state.messages.unseen_counts(&me.id).await?;

    let unseen_messages = counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(sender, count)| (sender.to_hex(), count))
        .collect();

    Ok(SidebarResponse {
        success: true,
        users: users.into_iter().map(UserResponse::from).collect(),
        unseen_messages,
    })
}

/// Full history with `other`, oldest first. Messages `other` sent to the
/// caller are marked seen as a side effect of opening the conversation.
pub async fn conversation(
    state: &AppState,
    me: &AuthUser,
    other: &str,
) -> Result<Vec<MessageResponse>, AppError> {
    let other_id = parse_id(other, "user")?;

    let marked = state
        .messages
        .mark_conversation_seen(&other_id, &me.id)
        .await?;
    if marked > 0 {
        log::debug!("👀 {} messages from {} marked seen by {}", marked, other_id, me.id);
    }

    let messages = state.messages.conversation(&me.id, &other_id).await?;

    Ok(messages.into_iter().map(MessageResponse::from).collect())
}

/// Persists a message and hands it to the fan-out.
pub async fn send_message(
    state: &AppState,
    me: &AuthUser,
    receiver: &str,
    request: &SendMessageRequest,
) -> Result<(MessageResponse, Delivery), AppError> {
    let receiver_id = parse_id(receiver, "receiver")?;

    let text = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let image = request
        .image
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty());

    if text.is_none() && image.is_none() {
        return Err(AppError::Validation(
            "Message must contain text or an image".to_string(),
        ));
    }

    if state.users.find_by_id(&receiver_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let image_url = match image {
        Some(data) => Some(state.upload_image(data).await?),
        None => None,
    };

    let stored = state
        .messages
        .insert(Message::new(me.id, receiver_id, text, image_url))
        .await?;

    let message = MessageResponse::from(stored);
    let delivery = state.fanout.deliver(&message).await;

    log::info!(
        "💬 Message {} from {} to {} ({:?})",
        message.id,
        message.sender_id,
        message.receiver_id,
        delivery
    );

    Ok((message, delivery))
}

/// Marks one received message as seen. Repeating the call is harmless.
pub async fn mark_seen(state: &AppState, me: &AuthUser, message_id: &str) -> Result<(), AppError> {
    let id = parse_id(message_id, "message")?;

    if state.messages.mark_seen(&id, &me.id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Message not found".to_string()))
    }
}
