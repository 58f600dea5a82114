//! HTTP handlers. Each one runs the fixed pipeline: identity,
//! authorization, existence, mutation — short-circuiting on the first
//! failure via `?` and `AppError`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use base64::Engine;
use serde::Deserialize;

use super::error::AppError;
use super::routes::AppState;
use super::types::{
    AuthResponse, CreateUserRequest, InviteRequest, InviteResponse, TokenResponse, UserResponse,
};
use crate::actions::{
    DeleteUserAction, InviteAction, ListOrgUsersAction, SignupAction,
};
use crate::crypto::SecretString;
use crate::providers::SlackClient;
use crate::repository::{AuthSource, UserRepository};
use crate::teams::actions::{AddAdminAction, DeleteTeamAction, RemoveAdminAction};
use crate::teams::TeamRepository;
use crate::token::SessionClaims;
use crate::AuthError;

/// Decodes `Authorization: Basic` credentials into (email, password).
fn extract_basic_credentials(headers: &HeaderMap) -> Result<(String, SecretString), AuthError> {
    let encoded = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Basic "))
        .ok_or(AuthError::InvalidCredentials)?;

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AuthError::InvalidCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidCredentials)?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or(AuthError::InvalidCredentials)?;
    Ok((email.to_owned(), SecretString::new(password)))
}

/// Body parse failures are validation failures, not framework faults.
fn require_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(AppError(AuthError::Validation(rejection.body_text()))),
    }
}

/// Caller must address their own organization.
fn ensure_same_org(claims: &SessionClaims, org_id: &str) -> Result<(), AppError> {
    if claims.org == org_id {
        Ok(())
    } else {
        Err(AppError(AuthError::OrgMismatch))
    }
}

/// Provider settings for the root route.
///
/// GET /
pub async fn settings<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    Json(state.gateway.settings(&headers))
}

/// Debug token diagnostics.
///
/// GET /test-token
pub async fn test_token<U, T, S>(
    State(state): State<AppState<U, T, S>>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let report = state.gateway.test_token()?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SsoAuthQuery {
    pub code: Option<String>,
}

/// OAuth callback: completes the code exchange and redirects with a
/// token or a failure reason.
///
/// GET /sso/auth
pub async fn sso_auth<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Query(query): Query<SsoAuthQuery>,
) -> impl IntoResponse
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let base = &state.base_url;

    let code = match query.code {
        Some(code) => code,
        None => return Redirect::to(&format!("{base}/?error=missing_code")),
    };

    match state.gateway.slack_provider().login_with_code(&code).await {
        Ok((_, token)) => Redirect::to(&format!("{base}/?token={token}")),
        Err(err) => {
            tracing::warn!(error = %err, "slack login failed");
            Redirect::to(&format!("{base}/?error=auth_failed"))
        }
    }
}

/// Reissues a Slack session after the provider confirms the access
/// token is still live.
///
/// GET /sso/refresh-token
pub async fn sso_refresh_token<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let token = state.gateway.refresh(&headers, AuthSource::Slack).await?;
    Ok(Json(TokenResponse {
        token: SecretString::new(token),
    }))
}

/// Email/password login with Basic credentials.
///
/// GET /email/auth
pub async fn email_auth<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let (email, password) = extract_basic_credentials(&headers)?;

    let (user, token) = state
        .gateway
        .email_provider()
        .authenticate(&email, &password)
        .await?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(user),
        token: SecretString::new(token),
    }))
}

/// Reissues an email session if the user/org pair still matches the
/// store.
///
/// GET /email/refresh-token
pub async fn email_refresh_token<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let token = state.gateway.refresh(&headers, AuthSource::Email).await?;
    Ok(Json(TokenResponse {
        token: SecretString::new(token),
    }))
}

/// Creates a local email user.
///
/// POST /email/users
pub async fn create_email_user<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let body = require_json(payload)?;

    let action = SignupAction::new(state.user_repo.clone(), state.gateway.codec().clone());
    let (user, token) = action
        .execute(
            &body.email,
            &body.name,
            &SecretString::new(body.password),
            body.org_id.as_deref(),
        )
        .await?;

    let location = format!("{}/org/{}/users/{}", state.base_url, user.org_id, user.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(AuthResponse {
            user: UserResponse::from(user),
            token: SecretString::new(token),
        }),
    ))
}

/// Lists the organization's users, excluding the caller.
///
/// GET /org/{org_id}/users
pub async fn list_org_users<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Path(org_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let claims = state.gateway.authenticate(&headers)?;
    ensure_same_org(&claims, &org_id)?;

    let action = ListOrgUsersAction::new(state.user_repo.clone());
    let users = action.execute(&org_id, &claims.sub).await?;

    Ok(Json(
        users.into_iter().map(UserResponse::from).collect::<Vec<_>>(),
    ))
}

/// Invites (or re-invites) a pending user into the organization.
///
/// POST /org/{org_id}/users/invite
pub async fn invite_user<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Path(org_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<InviteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let claims = state.gateway.authenticate(&headers)?;
    ensure_same_org(&claims, &org_id)?;
    let body = require_json(payload)?;

    let action = InviteAction::new(state.user_repo.clone());
    let outcome = action
        .execute(&org_id, &body.email, body.user_id.as_deref())
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(InviteResponse {
            user: UserResponse::from(outcome.user),
            secret: outcome.secret,
        }),
    ))
}

/// Deletes a user within the caller's organization.
///
/// DELETE /org/{org_id}/users/{user_id}
pub async fn delete_user<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Path((org_id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let claims = state.gateway.authenticate(&headers)?;
    ensure_same_org(&claims, &org_id)?;

    let action = DeleteUserAction::new(state.user_repo.clone());
    action.execute(&org_id, &user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /teams
pub async fn list_teams<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    state.gateway.authenticate(&headers)?;
    let teams = state.team_repo.list().await?;
    Ok(Json(teams))
}

/// GET /teams/{team_id}
pub async fn get_team<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    state.gateway.authenticate(&headers)?;
    let team = state
        .team_repo
        .find_by_id(&team_id)
        .await?
        .ok_or(AppError(AuthError::NotFound))?;
    Ok(Json(team))
}

/// Deletes a team; the caller must be one of its admins.
///
/// DELETE /teams/{team_id}
pub async fn delete_team<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let claims = state.gateway.authenticate(&headers)?;

    let action = DeleteTeamAction::new(state.team_repo.clone());
    action.execute(&team_id, &claims.sub).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Promotes a team member to admin; the caller must be an admin.
///
/// PUT /teams/{team_id}/admins/{user_id}
pub async fn add_team_admin<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Path((team_id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let claims = state.gateway.authenticate(&headers)?;

    let action = AddAdminAction::new(state.team_repo.clone(), state.user_repo.clone());
    let team = action.execute(&team_id, &user_id, &claims.sub).await?;

    Ok(Json(team))
}

/// Demotes a team admin; the caller must be an admin and the team must
/// keep at least one.
///
/// DELETE /teams/{team_id}/admins/{user_id}
pub async fn remove_team_admin<U, T, S>(
    State(state): State<AppState<U, T, S>>,
    Path((team_id, user_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    let claims = state.gateway.authenticate(&headers)?;

    let action = RemoveAdminAction::new(state.team_repo.clone());
    let team = action.execute(&team_id, &user_id, &claims.sub).await?;

    Ok(Json(team))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic_credentials() {
        let mut headers = HeaderMap::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode("user@example.com:pw");
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Basic {encoded}").parse().unwrap(),
        );

        let (email, password) = extract_basic_credentials(&headers).unwrap();
        assert_eq!(email, "user@example.com");
        assert_eq!(password.expose_secret(), "pw");
    }

    #[test]
    fn test_extract_basic_credentials_missing() {
        assert_eq!(
            extract_basic_credentials(&HeaderMap::new()).unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_extract_basic_credentials_not_base64() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Basic %%%".parse().unwrap(),
        );
        assert_eq!(
            extract_basic_credentials(&headers).unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_password_may_contain_colons() {
        let mut headers = HeaderMap::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode("a@b.com:p:w:x");
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Basic {encoded}").parse().unwrap(),
        );

        let (_, password) = extract_basic_credentials(&headers).unwrap();
        assert_eq!(password.expose_secret(), "p:w:x");
    }
}
