use std::sync::Arc;

use crate::database::{MessageRepository, UserRepository};
use crate::realtime::Fanout;
use crate::services::media_service::MediaUploader;
use crate::services::token_service::TokenService;

/// Shared services handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub tokens: TokenService,
    pub fanout: Fanout,
    /// None when no media service is configured
    pub media: Option<Arc<dyn MediaUploader>>,
    pub bcrypt_cost: u32,
    /// When false, `/ws` accepts a bare `userId`
    pub ws_require_token: bool,
}

impl AppState {
    /// Uploads an image through the configured media service.
    pub async fn upload_image(&self, data: &str) -> Result<String, crate::utils::AppError> {
        match &self.media {
            Some(media) => media.upload(data).await,
            None => Err(crate::utils::AppError::MediaError(
                "no media service configured".to_string(),
            )),
        }
    }
}
