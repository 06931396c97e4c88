pub mod auth;
pub mod health;
pub mod messages;
pub mod swagger;
pub mod ws;

use actix_web::web;

use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

/// JSON extractor settings: body size limit and `{success, message}` errors.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            log::warn!("⚠️  Rejected JSON body: {}", err);
            AppError::Validation("Invalid request body".to_string()).into()
        })
}

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health::health_check))
        .route("/api/status", web::get().to(health::status))
        // Realtime channel
        .route("/ws", web::get().to(ws::connect))
        // Auth endpoints
        .service(
            web::scope("/api/auth")
                .route("/signup", web::post().to(auth::signup))
                .route("/login", web::post().to(auth::login))
                .service(
                    web::resource("/check")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::check_auth)),
                )
                .service(
                    web::resource("/update-profile")
                        .wrap(AuthMiddleware)
                        .route(web::put().to(auth::update_profile)),
                ),
        )
        // Messages - Requires JWT
        .service(
            web::scope("/api/messages")
                .wrap(AuthMiddleware)
                .route("/users", web::get().to(messages::get_users))
                .route("/send/{user_id}", web::post().to(messages::send_message))
                .route("/mark/{id}", web::put().to(messages::mark_seen))
                // Catch-all, must stay last
                .route("/{user_id}", web::get().to(messages::get_messages)),
        );
}
