//! HTTP boundary: DTOs, routes, and the single error-to-status mapping.

mod error;
mod handlers;
mod routes;
mod types;

pub use error::AppError;
pub use routes::{routes, AppState};
pub use types::{
    AuthResponse, CreateUserRequest, ErrorResponse, InviteRequest, InviteResponse, TokenResponse,
    UserResponse,
};
