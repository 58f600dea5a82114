use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::{ProviderSettings, SettingsLink};
use crate::config::SlackConfig;
use crate::repository::{AuthSource, NewUser, User, UserRepository, UserStatus};
use crate::token::{SessionClaims, TokenCodec};
use crate::AuthError;

/// Canonical identity returned by the Slack code exchange.
#[derive(Debug, Clone)]
pub struct SlackIdentity {
    pub access_token: String,
    pub user_id: String,
    /// Slack workspace id; doubles as the organization id.
    pub org_id: String,
    pub name: String,
    pub email: String,
}

/// Boundary to the Slack Web API. The reqwest implementation talks to
/// Slack; tests substitute [`MockSlackClient`].
#[async_trait]
pub trait SlackClient {
    /// Completes the OAuth code exchange.
    async fn exchange_code(&self, code: &str) -> Result<SlackIdentity, AuthError>;
    /// Returns whether the access token is still accepted by Slack.
    async fn auth_test(&self, access_token: &str) -> Result<bool, AuthError>;
}

/// Slack SSO identity provider.
pub struct SlackProvider<U: UserRepository, S: SlackClient> {
    user_repo: U,
    client: S,
    codec: TokenCodec,
    authorize_url: String,
    base_url: String,
}

impl<U: UserRepository, S: SlackClient> SlackProvider<U, S> {
    pub fn new(
        user_repo: U,
        client: S,
        codec: TokenCodec,
        slack: &SlackConfig,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            user_repo,
            client,
            codec,
            authorize_url: slack.authorize_url.clone(),
            base_url: base_url.into(),
        }
    }

    /// Completes a login from an OAuth callback code: exchanges the
    /// code, finds or creates the user, and issues a token carrying the
    /// provider access token for later revalidation.
    pub async fn login_with_code(&self, code: &str) -> Result<(User, String), AuthError> {
        let identity = self.client.exchange_code(code).await?;

        let user = match self.user_repo.find_user_by_id(&identity.user_id).await? {
            Some(user) => user,
            None => {
                let user = self
                    .user_repo
                    .create_user(NewUser {
                        id: identity.user_id.clone(),
                        org_id: identity.org_id.clone(),
                        email: identity.email.clone(),
                        name: identity.name.clone(),
                        hashed_password: None,
                        auth_source: AuthSource::Slack,
                        status: UserStatus::Active,
                        invite_secret_hash: None,
                        teams: HashSet::new(),
                    })
                    .await?;
                tracing::info!(user_id = %user.id, org_id = %user.org_id, "slack user created");
                user
            }
        };

        let token = self.codec.issue(&user, Some(identity.access_token))?;
        Ok((user, token))
    }

    pub fn anonymous_settings(&self) -> ProviderSettings {
        ProviderSettings {
            links: vec![SettingsLink::new("authenticate", self.authorize_url.clone())],
        }
    }

    pub fn authed_settings(&self, claims: &SessionClaims) -> ProviderSettings {
        ProviderSettings {
            links: vec![
                SettingsLink::new("refresh", format!("{}/sso/refresh-token", self.base_url)),
                SettingsLink::new(
                    "org-users",
                    format!("{}/org/{}/users", self.base_url, claims.org),
                ),
                SettingsLink::new("teams", format!("{}/teams", self.base_url)),
            ],
        }
    }

    /// Reissues a token only after Slack confirms the carried access
    /// token is still valid. A dead provider token fails the refresh no
    /// matter what the local claims say; only then is the store
    /// consulted for staleness.
    pub async fn refresh(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        let access_token = claims.access_token.as_deref().ok_or(AuthError::TokenInvalid)?;

        if !self.client.auth_test(access_token).await? {
            tracing::warn!(user_id = %claims.sub, "refresh rejected: slack access token revoked");
            return Err(AuthError::TokenInvalid);
        }

        let user = self
            .user_repo
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::StaleIdentity)?;

        if user.org_id != claims.org {
            return Err(AuthError::StaleIdentity);
        }

        self.codec.issue(&user, Some(access_token.to_owned()))
    }
}

// --- reqwest implementation ---

#[derive(Debug, Deserialize)]
struct OauthAccessResponse {
    ok: bool,
    error: Option<String>,
    access_token: Option<String>,
    user: Option<OauthUser>,
    team: Option<OauthTeam>,
}

#[derive(Debug, Deserialize)]
struct OauthUser {
    id: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OauthTeam {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
}

/// [`SlackClient`] over the Slack Web API with a bounded timeout.
/// Transport failures and timeouts surface as `ProviderUnavailable`;
/// they are reported, never retried inline.
#[derive(Clone)]
pub struct HttpSlackClient {
    http: reqwest::Client,
    config: SlackConfig,
}

impl HttpSlackClient {
    /// # Errors
    /// Returns `ConfigurationError` if the HTTP client cannot be built.
    pub fn new(config: SlackConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::ConfigurationError(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl SlackClient for HttpSlackClient {
    async fn exchange_code(&self, code: &str) -> Result<SlackIdentity, AuthError> {
        let url = format!("{}/oauth.access", self.config.api_base);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?
            .json::<OauthAccessResponse>()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        if !response.ok {
            tracing::warn!(
                error = response.error.as_deref().unwrap_or("unknown"),
                "slack code exchange rejected"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = response.access_token.ok_or(AuthError::InvalidCredentials)?;
        let user = response.user.ok_or(AuthError::InvalidCredentials)?;
        let team = response.team.ok_or(AuthError::InvalidCredentials)?;

        Ok(SlackIdentity {
            access_token,
            user_id: user.id,
            org_id: team.id,
            name: user.name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
        })
    }

    async fn auth_test(&self, access_token: &str) -> Result<bool, AuthError> {
        let url = format!("{}/auth.test", self.config.api_base);
        let response = self
            .http
            .get(&url)
            .query(&[("token", access_token)])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?
            .json::<AuthTestResponse>()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        Ok(response.ok)
    }
}

// --- test double ---

/// In-memory [`SlackClient`]: codes map to identities, access tokens
/// can be revoked, and the whole provider can be made unreachable.
#[derive(Clone, Default)]
pub struct MockSlackClient {
    inner: Arc<Mutex<MockSlackState>>,
}

#[derive(Default)]
struct MockSlackState {
    identities: Vec<(String, SlackIdentity)>,
    revoked_tokens: HashSet<String>,
    unreachable: bool,
}

impl MockSlackClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a code the client will accept.
    pub fn accept_code(&self, code: &str, identity: SlackIdentity) {
        let mut state = self.inner.lock().unwrap();
        state.identities.push((code.to_owned(), identity));
    }

    pub fn revoke_token(&self, access_token: &str) {
        let mut state = self.inner.lock().unwrap();
        state.revoked_tokens.insert(access_token.to_owned());
    }

    /// Makes every call fail with `ProviderUnavailable`.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unwrap().unreachable = unreachable;
    }
}

#[async_trait]
impl SlackClient for MockSlackClient {
    async fn exchange_code(&self, code: &str) -> Result<SlackIdentity, AuthError> {
        let state = self.inner.lock().unwrap();
        if state.unreachable {
            return Err(AuthError::ProviderUnavailable("mock slack is down".to_owned()));
        }
        state
            .identities
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, identity)| identity.clone())
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn auth_test(&self, access_token: &str) -> Result<bool, AuthError> {
        let state = self.inner.lock().unwrap();
        if state.unreachable {
            return Err(AuthError::ProviderUnavailable("mock slack is down".to_owned()));
        }
        Ok(!state.revoked_tokens.contains(access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::repository::MemoryUserRepository;

    fn identity() -> SlackIdentity {
        SlackIdentity {
            access_token: "xoxp-token".to_owned(),
            user_id: "U123".to_owned(),
            org_id: "T999".to_owned(),
            name: "Slack User".to_owned(),
            email: "slack@example.com".to_owned(),
        }
    }

    fn provider(
        repo: MemoryUserRepository,
        client: MockSlackClient,
    ) -> SlackProvider<MemoryUserRepository, MockSlackClient> {
        let config = GatewayConfig::new(
            "test-secret-32-bytes-long-key-01",
            "http://localhost",
            SlackConfig::new("id", "secret"),
        )
        .unwrap();
        let codec = TokenCodec::new(&config);
        SlackProvider::new(repo, client, codec, &config.slack, "http://localhost")
    }

    #[tokio::test]
    async fn test_login_creates_user() {
        let repo = MemoryUserRepository::new();
        let client = MockSlackClient::new();
        client.accept_code("good-code", identity());
        let provider = provider(repo.clone(), client);

        let (user, token) = provider.login_with_code("good-code").await.unwrap();
        assert_eq!(user.id, "U123");
        assert_eq!(user.org_id, "T999");
        assert_eq!(user.auth_source, AuthSource::Slack);
        assert_eq!(user.status, UserStatus::Active);

        let claims = provider.codec.decode(&token).unwrap();
        assert_eq!(claims.access_token.as_deref(), Some("xoxp-token"));

        // second login reuses the record
        let (user2, _) = provider.login_with_code("good-code").await.unwrap();
        assert_eq!(user2.id, user.id);
        assert_eq!(repo.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_bad_code() {
        let provider = provider(MemoryUserRepository::new(), MockSlackClient::new());
        let result = provider.login_with_code("bad-code").await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_refresh_requires_live_access_token() {
        let repo = MemoryUserRepository::new();
        let client = MockSlackClient::new();
        client.accept_code("good-code", identity());
        let provider = provider(repo, client.clone());

        let (user, token) = provider.login_with_code("good-code").await.unwrap();
        let claims = provider.codec.decode(&token).unwrap();

        // valid token refreshes
        let refreshed = provider.refresh(&claims).await.unwrap();
        let reissued = provider.codec.decode(&refreshed).unwrap();
        assert_eq!(reissued.sub, user.id);

        // revoked token fails regardless of local claim state
        client.revoke_token("xoxp-token");
        let result = provider.refresh(&claims).await;
        assert_eq!(result.unwrap_err(), AuthError::TokenInvalid);
    }

    #[tokio::test]
    async fn test_refresh_without_access_token_claim() {
        let repo = MemoryUserRepository::new();
        let client = MockSlackClient::new();
        client.accept_code("good-code", identity());
        let provider = provider(repo, client);

        let (_, token) = provider.login_with_code("good-code").await.unwrap();
        let mut claims = provider.codec.decode(&token).unwrap();
        claims.access_token = None;

        let result = provider.refresh(&claims).await;
        assert_eq!(result.unwrap_err(), AuthError::TokenInvalid);
    }

    #[tokio::test]
    async fn test_refresh_provider_unreachable() {
        let repo = MemoryUserRepository::new();
        let client = MockSlackClient::new();
        client.accept_code("good-code", identity());
        let provider = provider(repo, client.clone());

        let (_, token) = provider.login_with_code("good-code").await.unwrap();
        let claims = provider.codec.decode(&token).unwrap();

        client.set_unreachable(true);
        let result = provider.refresh(&claims).await;
        assert!(matches!(result.unwrap_err(), AuthError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_refresh_stale_after_user_deleted() {
        let repo = MemoryUserRepository::new();
        let client = MockSlackClient::new();
        client.accept_code("good-code", identity());
        let provider = provider(repo.clone(), client);

        let (_, token) = provider.login_with_code("good-code").await.unwrap();
        let claims = provider.codec.decode(&token).unwrap();

        repo.delete_user("U123").await.unwrap();
        let result = provider.refresh(&claims).await;
        assert_eq!(result.unwrap_err(), AuthError::StaleIdentity);
    }

    #[test]
    fn test_anonymous_settings_point_at_authorize_url() {
        let settings = provider(MemoryUserRepository::new(), MockSlackClient::new())
            .anonymous_settings();
        assert_eq!(settings.links.len(), 1);
        assert!(settings.links[0].href.contains("slack.com/oauth/authorize"));
    }
}
