use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;

use super::handlers;
use crate::gateway::AuthGateway;
use crate::providers::SlackClient;
use crate::repository::UserRepository;
use crate::teams::TeamRepository;

/// Shared per-process state: the gateway plus the two stores. The
/// gateway is immutable after startup and shared behind an `Arc`.
pub struct AppState<U, T, S>
where
    U: UserRepository + Clone,
    S: SlackClient,
{
    pub gateway: Arc<AuthGateway<U, S>>,
    pub user_repo: U,
    pub team_repo: T,
    pub base_url: String,
}

impl<U, T, S> Clone for AppState<U, T, S>
where
    U: UserRepository + Clone,
    T: Clone,
    S: SlackClient,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            user_repo: self.user_repo.clone(),
            team_repo: self.team_repo.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// The full HTTP surface.
pub fn routes<U, T, S>() -> Router<AppState<U, T, S>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    T: TeamRepository + Clone + Send + Sync + 'static,
    S: SlackClient + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handlers::settings::<U, T, S>))
        .route("/test-token", get(handlers::test_token::<U, T, S>))
        .route("/sso/auth", get(handlers::sso_auth::<U, T, S>))
        .route(
            "/sso/refresh-token",
            get(handlers::sso_refresh_token::<U, T, S>),
        )
        .route("/email/auth", get(handlers::email_auth::<U, T, S>))
        .route(
            "/email/refresh-token",
            get(handlers::email_refresh_token::<U, T, S>),
        )
        .route("/email/users", post(handlers::create_email_user::<U, T, S>))
        .route(
            "/org/{org_id}/users",
            get(handlers::list_org_users::<U, T, S>),
        )
        .route(
            "/org/{org_id}/users/invite",
            post(handlers::invite_user::<U, T, S>),
        )
        .route(
            "/org/{org_id}/users/{user_id}",
            delete(handlers::delete_user::<U, T, S>),
        )
        .route("/teams", get(handlers::list_teams::<U, T, S>))
        .route(
            "/teams/{team_id}",
            get(handlers::get_team::<U, T, S>).delete(handlers::delete_team::<U, T, S>),
        )
        .route(
            "/teams/{team_id}/admins/{user_id}",
            put(handlers::add_team_admin::<U, T, S>)
                .delete(handlers::remove_team_admin::<U, T, S>),
        )
}
