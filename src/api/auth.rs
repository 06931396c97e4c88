use actix_web::{web, HttpResponse};

use crate::models::AuthUser;
use crate::services::auth_service::{
    self, AuthResponse, LoginRequest, SignupRequest, UpdateProfileRequest,
};
use crate::state::AppState;
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing Details"),
        (status = 409, description = "Account already exists")
    )
)]
pub async fn signup(
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let email_str = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /auth/signup - email: {}", email_str);

    let response = auth_service::signup(&state, &request).await?;
    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Email and password required"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let email_str = request.email.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /auth/login - email: {}", email_str);

    match auth_service::login(&state, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", email_str);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email_str, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/check",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_auth(user: web::ReqData<AuthUser>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user.profile
    }))
}

#[utoipa::path(
    put,
    path = "/api/auth/update-profile",
    tag = "Auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Image upload failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("👤 PUT /auth/update-profile - user: {}", user.id);

    let updated = auth_service::update_profile(&state, &user, &request).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": updated
    })))
}
