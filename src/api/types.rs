use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::SecretString;
use crate::repository::{AuthSource, User, UserStatus};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// Organization to create the user in; omitted means the user
    /// gets a fresh one.
    pub org_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    /// When re-inviting, the expected user id; a mismatch is a 404.
    pub user_id: Option<String>,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub org_id: String,
    pub email: String,
    pub name: String,
    pub auth_source: AuthSource,
    pub status: UserStatus,
    pub teams: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let mut teams: Vec<String> = user.teams.into_iter().collect();
        teams.sort();
        UserResponse {
            id: user.id,
            org_id: user.org_id,
            email: user.email,
            name: user.name,
            auth_source: user.auth_source,
            status: user.status,
            teams,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: SecretString,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: SecretString,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// The one-time invite secret rides back exactly once, here.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub user: UserResponse,
    pub secret: SecretString,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<crate::AuthError> for ErrorResponse {
    fn from(err: crate::AuthError) -> Self {
        ErrorResponse {
            error: err.to_string(),
        }
    }
}
