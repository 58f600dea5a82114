use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ErrorResponse;
use crate::AuthError;

/// Converts `AuthError` into HTTP responses. This is the only place
/// that knows the status-code taxonomy; handlers never re-interpret
/// failures.
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse::from(self.0.clone());
        let status = match &self.0 {
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::OrgMismatch => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Validation(_)
            | AuthError::NotTeamMember
            | AuthError::StaleIdentity => StatusCode::BAD_REQUEST,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::UserAlreadyExists
            | AuthError::AlreadyActivated
            | AuthError::LastAdmin
            | AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::PasswordHashError
            | AuthError::ConfigurationError(_)
            | AuthError::ProviderUnavailable(_)
            | AuthError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AuthError) -> StatusCode {
        AppError(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AuthError::TokenInvalid), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::OrgMismatch), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::StaleIdentity), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AuthError::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_of(AuthError::AlreadyActivated), StatusCode::CONFLICT);
        assert_eq!(status_of(AuthError::LastAdmin), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AuthError::ProviderUnavailable("down".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
