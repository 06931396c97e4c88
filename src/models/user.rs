use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Usuário armazenado no MongoDB (coleção `users`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Unique across the collection
    pub email: String,

    /// bcrypt hash
    pub password: String,

    pub full_name: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default)]
    pub profile_pic: String,

    /// Unix timestamp (ms)
    pub created_at: i64,

    pub updated_at: i64,
}

/// Campos alteráveis pelo próprio usuário
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
}

/// User as sent over the wire. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub profile_pic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            full_name: user.full_name,
            bio: user.bio,
            profile_pic: user.profile_pic,
            created_at: millis_to_datetime(user.created_at),
            updated_at: millis_to_datetime(user.updated_at),
        }
    }
}

/// Resolved caller, attached to the request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub profile: UserResponse,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        let id = user.id.unwrap_or_default();
        AuthUser {
            id,
            profile: UserResponse::from(user),
        }
    }
}

pub(crate) fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
