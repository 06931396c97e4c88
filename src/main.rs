use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use chat_service::api;
use chat_service::config::Config;
use chat_service::database::MongoDB;
use chat_service::realtime::{Fanout, LocalPresence};
use chat_service::services::media_service::{CloudinaryUploader, MediaUploader};
use chat_service::services::token_service::TokenService;
use chat_service::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    log::info!("🚀 Starting Chat Service...");

    // Initialize MongoDB connection
    let db = match MongoDB::new(&config.database_url, config.db_timeout).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
        }
    };
    log::info!("✅ MongoDB connected successfully");

    let store = Arc::new(db);

    let media: Option<Arc<dyn MediaUploader>> = match config.cloudinary.clone() {
        Some(cloudinary) => {
            log::info!("🖼️  Media uploads enabled (cloud: {})", cloudinary.cloud_name);
            Some(Arc::new(CloudinaryUploader::new(cloudinary)))
        }
        None => {
            log::warn!("⚠️  Cloudinary not configured, image uploads will be rejected");
            None
        }
    };

    let state = web::Data::new(AppState {
        users: store.clone(),
        messages: store,
        tokens: TokenService::new(
            &config.jwt_secret,
            chrono::Duration::days(config.jwt_expiry_days),
        ),
        fanout: Fanout::new(Arc::new(LocalPresence::new())),
        media,
        bcrypt_cost: config.bcrypt_cost,
        ws_require_token: config.ws_require_token,
    });

    if !config.ws_require_token {
        log::warn!("⚠️  WS_REQUIRE_TOKEN is off, /ws trusts the userId query parameter");
    }

    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("🔌 WebSocket endpoint at: ws://{}:{}/ws?userId=<id>", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::HeaderName::from_static("token"),
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        // Lista vazia = qualquer origem
        if config.cors_origins.is_empty() {
            cors = cors.allow_any_origin();
        } else {
            for origin in &config.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .app_data(api::json_config(config.json_limit))
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
