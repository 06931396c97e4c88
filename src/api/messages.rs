use actix_web::{web, HttpResponse};

use crate::models::{AuthUser, SendMessageRequest};
use crate::services::message_service::{self, SidebarResponse};
use crate::state::AppState;
use crate::utils::AppError;

/// GET /api/messages/users - Todos os outros usuários + contadores não lidos
#[utoipa::path(
    get,
    path = "/api/messages/users",
    tag = "Messages",
    responses(
        (status = 200, description = "Users and unseen counters", body = SidebarResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_users(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let sidebar = message_service::users_for_sidebar(&state, &user).await?;
    Ok(HttpResponse::Ok().json(sidebar))
}

/// GET /api/messages/{user_id} - Histórico completo, mais antigas primeiro
#[utoipa::path(
    get,
    path = "/api/messages/{user_id}",
    tag = "Messages",
    params(("user_id" = String, Path, description = "Other participant")),
    responses(
        (status = 200, description = "Conversation history"),
        (status = 400, description = "Invalid user id"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_messages(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let other = path.into_inner();
    let messages = message_service::conversation(&state, &user, &other).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "messages": messages
    })))
}

/// POST /api/messages/send/{user_id} - Persiste e entrega em tempo real
#[utoipa::path(
    post,
    path = "/api/messages/send/{user_id}",
    tag = "Messages",
    params(("user_id" = String, Path, description = "Receiver")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored"),
        (status = 400, description = "Empty message or invalid id"),
        (status = 404, description = "Receiver not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<String>,
    request: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let receiver = path.into_inner();
    let (message, _delivery) =
        message_service::send_message(&state, &user, &receiver, &request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "newMessage": message
    })))
}

/// PUT /api/messages/mark/{id} - Marca como lida
#[utoipa::path(
    put,
    path = "/api/messages/mark/{id}",
    tag = "Messages",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Marked as seen"),
        (status = 404, description = "Message not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_seen(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    message_service::mark_seen(&state, &user, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
