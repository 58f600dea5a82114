pub mod actions;
pub mod api;
pub mod config;
pub mod crypto;
pub mod gateway;
pub mod providers;
pub mod repository;
pub mod teams;
pub mod token;

pub use config::{GatewayConfig, SlackConfig};
pub use crypto::SecretString;
pub use gateway::AuthGateway;
pub use repository::{AuthSource, MemoryUserRepository, User, UserRepository, UserStatus};
pub use token::{SessionClaims, TokenCodec};

use std::fmt;

/// Failure taxonomy shared by every core operation.
///
/// Handlers map these to HTTP status codes exactly once, in
/// `api::AppError`; core code never reasons about status codes.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Bad email/password pair or a failed OAuth code exchange.
    InvalidCredentials,
    /// Missing, malformed, or tampered token.
    TokenInvalid,
    /// Token signature is fine but the expiry has passed.
    TokenExpired,
    /// Token claims no longer match the persisted user (user gone or
    /// moved to another organization).
    StaleIdentity,
    /// The caller's organization does not match the one addressed by
    /// the request.
    OrgMismatch,
    /// The caller is not an admin of the addressed team.
    Forbidden,
    NotFound,
    UserAlreadyExists,
    /// Re-invite of a user who has already activated their account.
    AlreadyActivated,
    /// Removing this admin would leave the team without any.
    LastAdmin,
    /// Admin-set mutations require the target to be a team member.
    NotTeamMember,
    /// Generic conflict with existing state (duplicate team id,
    /// re-invite into a different organization).
    Conflict(String),
    Validation(String),
    PasswordHashError,
    ConfigurationError(String),
    /// Upstream identity provider failed or timed out. Surfaced, never
    /// retried inline.
    ProviderUnavailable(String),
    StoreError(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::StaleIdentity => write!(f, "Token identity no longer matches the store"),
            AuthError::OrgMismatch => write!(f, "Wrong organization"),
            AuthError::Forbidden => write!(f, "Not a team admin"),
            AuthError::NotFound => write!(f, "Not found"),
            AuthError::UserAlreadyExists => write!(f, "User already exists"),
            AuthError::AlreadyActivated => write!(f, "User has already been activated"),
            AuthError::LastAdmin => write!(f, "Cannot remove the last admin of a team"),
            AuthError::NotTeamMember => write!(f, "Target user is not a member of the team"),
            AuthError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AuthError::Validation(msg) => write!(f, "Validation failed: {msg}"),
            AuthError::PasswordHashError => write!(f, "Failed to hash password"),
            AuthError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            AuthError::ProviderUnavailable(msg) => {
                write!(f, "Identity provider unavailable: {msg}")
            }
            AuthError::StoreError(msg) => write!(f, "Store error: {msg}"),
        }
    }
}
