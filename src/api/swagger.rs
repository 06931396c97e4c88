use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat Service API",
        version = "1.0.0",
        description = "Two-user real-time chat backend.\n\n**Authentication:** messaging endpoints require a JWT Bearer token (or a `token` header).\n\n**Realtime:** open `GET /ws?userId=<id>` to receive `newMessage` and `getOnlineUsers` frames."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::check_auth,
        crate::api::auth::update_profile,

        // Messages
        crate::api::messages::get_users,
        crate::api::messages::get_messages,
        crate::api::messages::send_message,
        crate::api::messages::mark_seen,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::UpdateProfileRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::message_service::SidebarResponse,
            crate::models::UserResponse,
            crate::models::MessageResponse,
            crate::models::SendMessageRequest,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Signup, login and profile management."),
        (name = "Messages", description = "Conversation history, sending and seen tracking."),
        (name = "Health", description = "Liveness endpoints."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
