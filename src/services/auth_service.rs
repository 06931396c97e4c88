use bcrypt::{hash, verify};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::{AuthUser, ProfileUpdate, User, UserResponse};
use crate::state::AppState;
use crate::utils::AppError;

// Request/Response structures
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    /// Base64 data URI of the new picture
    pub profile_pic: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user_data: UserResponse,
    pub message: String,
}

/// Trimmed value, or None when absent or blank.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    Ok(tokio::task::spawn_blocking(move || hash(password, cost)).await??)
}

async fn verify_password(password: String, hashed: String) -> Result<bool, AppError> {
    Ok(tokio::task::spawn_blocking(move || verify(password, &hashed)).await??)
}

// User signup
pub async fn signup(state: &AppState, request: &SignupRequest) -> Result<AuthResponse, AppError> {
    let (Some(full_name), Some(email), Some(password), Some(bio)) = (
        present(&request.full_name),
        present(&request.email),
        // Passwords are taken verbatim, only emptiness is checked
        request.password.clone().filter(|p| !p.is_empty()),
        present(&request.bio),
    ) else {
        return Err(AppError::Validation("Missing Details".to_string()));
    };

    let email = normalize_email(&email);

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Account already exists".to_string()));
    }

    let hashed_password = hash_password(password, state.bcrypt_cost).await?;

    let now = Utc::now().timestamp_millis();
    let new_user = state
        .users
        .insert(User {
            id: None,
            email: email.clone(),
            password: hashed_password,
            full_name,
            bio,
            profile_pic: String::new(),
            created_at: now,
            updated_at: now,
        })
        .await?;

    let user_data = UserResponse::from(new_user);
    let token = state.tokens.issue(&user_data.id)?;

    log::info!("✅ User registered successfully: {}", email);

    Ok(AuthResponse {
        success: true,
        token,
        user_data,
        message: "Account created successfully".to_string(),
    })
}

// User login
pub async fn login(state: &AppState, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let (Some(email), Some(password)) = (
        present(&request.email),
        request.password.clone().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Email and password required".to_string()));
    };

    let user = state
        .users
        .find_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(password, user.password.clone()).await? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let user_data = UserResponse::from(user);
    let token = state.tokens.issue(&user_data.id)?;

    Ok(AuthResponse {
        success: true,
        token,
        user_data,
        message: "Login successful".to_string(),
    })
}

/// Resolves a bearer token to the user it names.
pub async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = state.tokens.verify(token)?;

    let user_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    let user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(AuthUser::from(user))
}

// Update name, bio and (optionally) picture of the caller
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    request: &UpdateProfileRequest,
) -> Result<UserResponse, AppError> {
    let profile_pic = match present(&request.profile_pic) {
        Some(data) => Some(state.upload_image(&data).await?),
        None => None,
    };

    let update = ProfileUpdate {
        full_name: present(&request.full_name),
        bio: present(&request.bio),
        profile_pic,
    };

    let updated = state
        .users
        .update_profile(&user.id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    log::info!("✅ Profile updated: {}", user.id);

    Ok(UserResponse::from(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            full_name: Some("Alice Example".to_string()),
            email: Some(email.to_string()),
            password: Some("hunter22".to_string()),
            bio: Some("Hello there".to_string()),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (state, _store) = test_state();

        let created = signup(&state, &signup_request("alice@example.com")).await.unwrap();
        assert!(created.success);
        assert_eq!(created.user_data.full_name, "Alice Example");

        let logged_in = login(
            &state,
            &LoginRequest {
                email: Some("Alice@Example.com ".to_string()),
                password: Some("hunter22".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.user_data.id, created.user_data.id);

        let claims = state.tokens.verify(&logged_in.token).unwrap();
        assert_eq!(claims.sub, created.user_data.id);
    }

    #[tokio::test]
    async fn test_signup_without_bio_creates_nothing() {
        let (state, store) = test_state();
        let mut request = signup_request("bob@example.com");
        request.bio = None;

        match signup(&state, &request).await {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Missing Details"),
            other => panic!("expected validation error, got {:?}", other.map(|r| r.message)),
        }
        assert_eq!(store.user_count(), 0);

        let login_attempt = login(
            &state,
            &LoginRequest {
                email: Some("bob@example.com".to_string()),
                password: Some("hunter22".to_string()),
            },
        )
        .await;
        assert!(matches!(login_attempt, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (state, store) = test_state();
        signup(&state, &signup_request("carol@example.com")).await.unwrap();

        let second = signup(&state, &signup_request("carol@example.com")).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (state, _store) = test_state();
        signup(&state, &signup_request("dave@example.com")).await.unwrap();

        let result = login(
            &state,
            &LoginRequest {
                email: Some("dave@example.com".to_string()),
                password: Some("wrong".to_string()),
            },
        )
        .await;
        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid credentials"),
            other => panic!("expected unauthorized, got {:?}", other.map(|r| r.message)),
        }
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (state, _store) = test_state();
        let result = login(
            &state,
            &LoginRequest {
                email: Some("x@example.com".to_string()),
                password: None,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_and_update_profile() {
        let (state, _store) = test_state();
        let created = signup(&state, &signup_request("erin@example.com")).await.unwrap();

        let user = authenticate(&state, &created.token).await.unwrap();
        assert_eq!(user.profile.email, "erin@example.com");

        let updated = update_profile(
            &state,
            &user,
            &UpdateProfileRequest {
                full_name: Some("Erin Updated".to_string()),
                bio: None,
                profile_pic: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.full_name, "Erin Updated");
        assert_eq!(updated.bio, "Hello there");
        assert!(updated.profile_pic.starts_with("https://media.example.com/"));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let (state, _store) = test_state();
        let token = state.tokens.issue(&ObjectId::new().to_hex()).unwrap();

        match authenticate(&state, &token).await {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "User not found"),
            other => panic!("expected unauthorized, got {:?}", other.map(|u| u.id)),
        }
    }
}
