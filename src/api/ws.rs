use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::realtime::WsSession;
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsParams {
    pub user_id: Option<String>,
    pub token: Option<String>,
}

/// Checks the handshake parameters and returns the canonical user id.
///
/// A handshake without `token` is trusted on `userId` alone unless
/// `ws_require_token` is set. Without it, anyone who knows a user id can
/// register as that user and, since the newest connection wins, take over
/// its live pushes. Stored history stays behind the HTTP auth either way.
pub fn validate_params(state: &AppState, params: &WsParams) -> Result<String, AppError> {
    let raw = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))?;

    let user_id = ObjectId::parse_str(raw)
        .map_err(|_| AppError::Validation("Invalid user id".to_string()))?
        .to_hex();

    match params.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => {
            let claims = state.tokens.verify(token)?;
            if claims.sub != user_id {
                return Err(AppError::Unauthorized(
                    "Token does not match userId".to_string(),
                ));
            }
        }
        None if state.ws_require_token => {
            return Err(AppError::Unauthorized("jwt must be provided".to_string()));
        }
        None => {}
    }

    Ok(user_id)
}

/// GET /ws?userId=… - Abre o canal em tempo real
pub async fn connect(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<WsParams>,
) -> Result<HttpResponse, Error> {
    let user_id = validate_params(&state, &query)?;

    log::info!("🔌 WebSocket handshake from {}", user_id);

    ws::start(WsSession::new(user_id, state.fanout.clone()), &req, stream)
}
