use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::AuthError;

/// Which identity provider produced a user or session.
///
/// Closed set: the gateway matches on this exhaustively, so adding a
/// provider is a compile-time change, not a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    Email,
    Slack,
}

impl AuthSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Slack => "slack",
        }
    }
}

/// Lifecycle state of a user record.
///
/// Invited users start `Pending` and are re-invitable; activation is a
/// one-way transition performed outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Active,
}

/// Canonical identity record, owned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Tenant the user belongs to.
    pub org_id: String,
    pub email: String,
    pub name: String,
    /// Present only for email-sourced users. Pending users carry an
    /// unusable random placeholder until activation.
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub auth_source: AuthSource,
    pub status: UserStatus,
    /// SHA-256 of the one-time invite secret, present while pending.
    #[serde(skip_serializing)]
    pub invite_secret_hash: Option<String>,
    /// Teams the user is a member of.
    pub teams: HashSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_pending(&self) -> bool {
        self.status == UserStatus::Pending
    }

    pub fn is_member_of(&self, team_id: &str) -> bool {
        self.teams.contains(team_id)
    }
}

/// Input for creating a user. The caller chooses the id: email signups
/// generate one, the Slack provider reuses the provider's user id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub org_id: String,
    pub email: String,
    pub name: String,
    pub hashed_password: Option<String>,
    pub auth_source: AuthSource,
    pub status: UserStatus,
    pub invite_secret_hash: Option<String>,
    pub teams: HashSet<String>,
}

/// Store contract for user records.
///
/// The store is addressed by primary key; each call is a scoped access
/// released on every exit path. Uniqueness of `email` is enforced by
/// `create_user`.
#[async_trait]
pub trait UserRepository {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn list_users_by_org(&self, org_id: &str) -> Result<Vec<User>, AuthError>;
    /// Fails with `UserAlreadyExists` if the email or id is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError>;
    /// Rotates the pending user's one-time invite secret.
    async fn update_invite_secret(
        &self,
        user_id: &str,
        secret_hash: &str,
    ) -> Result<User, AuthError>;
    /// Flips a pending user to active. Performed by the activation
    /// collaborator, exposed here so tests can drive the lifecycle.
    async fn activate_user(&self, user_id: &str) -> Result<User, AuthError>;
    async fn delete_user(&self, user_id: &str) -> Result<(), AuthError>;
}
