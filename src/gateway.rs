//! Per-request orchestration: extract a token, decode it, route to the
//! matching identity provider, act.
//!
//! Each stage is an explicit function returning a tagged outcome; the
//! pipeline is fixed and short-circuits on the first failure. A missing
//! token is not an error — it selects the anonymous path — but routes
//! that require identity turn any extraction or decode failure into a
//! hard `TokenInvalid`.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::providers::{EmailProvider, ProviderSettings, SlackClient, SlackProvider};
use crate::repository::{AuthSource, UserRepository};
use crate::token::{SessionClaims, TokenCodec};
use crate::AuthError;

/// Settings payload for `GET /`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SettingsResponse {
    /// Union of both providers' public settings.
    Anonymous {
        email: ProviderSettings,
        slack: ProviderSettings,
    },
    /// The authenticated session's provider-specific settings.
    Authenticated {
        source: AuthSource,
        #[serde(flatten)]
        settings: ProviderSettings,
    },
}

/// Diagnostics payload for `GET /test-token`.
#[derive(Debug, Serialize)]
pub struct TestTokenReport {
    pub token: String,
    pub verified: bool,
    pub decoded: Option<SessionClaims>,
}

pub struct AuthGateway<U, S>
where
    U: UserRepository + Clone,
    S: SlackClient,
{
    codec: TokenCodec,
    email: EmailProvider<U>,
    slack: SlackProvider<U, S>,
}

/// Reads the bearer token out of the `Authorization` header, if any.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

impl<U, S> AuthGateway<U, S>
where
    U: UserRepository + Clone,
    S: SlackClient,
{
    pub fn new(user_repo: U, slack_client: S, config: &GatewayConfig) -> Self {
        let codec = TokenCodec::new(config);
        let email = EmailProvider::new(user_repo.clone(), codec.clone(), config.base_url.clone());
        let slack = SlackProvider::new(
            user_repo,
            slack_client,
            codec.clone(),
            &config.slack,
            config.base_url.clone(),
        );
        Self { codec, email, slack }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn email_provider(&self) -> &EmailProvider<U> {
        &self.email
    }

    pub fn slack_provider(&self) -> &SlackProvider<U, S> {
        &self.slack
    }

    /// Identity precondition for routes that require a caller: a
    /// missing, malformed, tampered, or expired token is a hard
    /// failure here, never a silent anonymous downgrade.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<SessionClaims, AuthError> {
        let token = extract_bearer_token(headers).ok_or(AuthError::TokenInvalid)?;
        self.codec.decode_verified(&token)
    }

    /// Settings for `GET /`. Anything short of a verified token gets
    /// the anonymous union of both providers' public settings.
    pub fn settings(&self, headers: &HeaderMap) -> SettingsResponse {
        match self.authenticate(headers) {
            Ok(claims) => {
                let settings = match claims.src {
                    AuthSource::Email => self.email.authed_settings(&claims),
                    AuthSource::Slack => self.slack.authed_settings(&claims),
                };
                SettingsResponse::Authenticated {
                    source: claims.src,
                    settings,
                }
            }
            Err(_) => SettingsResponse::Anonymous {
                email: self.email.anonymous_settings(),
                slack: self.slack.anonymous_settings(),
            },
        }
    }

    /// Refresh for the provider a route belongs to. The token's source
    /// must match the route's provider; anything else is an invalid
    /// token, not a cross-provider refresh.
    pub async fn refresh(
        &self,
        headers: &HeaderMap,
        expected: AuthSource,
    ) -> Result<String, AuthError> {
        let claims = self.authenticate(headers)?;

        if claims.src != expected {
            return Err(AuthError::TokenInvalid);
        }

        match expected {
            AuthSource::Email => self.email.refresh(&claims).await,
            AuthSource::Slack => self.slack.refresh(&claims).await,
        }
    }

    /// Issues a fixed debug token and reports how it decodes and
    /// verifies, for wiring diagnostics.
    pub fn test_token(&self) -> Result<TestTokenReport, AuthError> {
        let claims = self.codec.stamp(SessionClaims {
            sub: "test-user".to_owned(),
            org: "test-org".to_owned(),
            src: AuthSource::Email,
            teams: vec!["test-team".to_owned()],
            name: "Test User".to_owned(),
            access_token: None,
            exp: 0,
            iat: 0,
        });

        let token = self.codec.generate(&claims)?;
        let verified = self.codec.verify(&token);
        let decoded = self.codec.decode(&token).ok();

        Ok(TestTokenReport {
            token,
            verified,
            decoded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlackConfig;
    use crate::crypto::Argon2Hasher;
    use crate::crypto::PasswordHasher;
    use crate::providers::MockSlackClient;
    use crate::repository::{MemoryUserRepository, NewUser, UserStatus};
    use std::collections::HashSet;

    fn gateway() -> (
        AuthGateway<MemoryUserRepository, MockSlackClient>,
        MemoryUserRepository,
    ) {
        let config = GatewayConfig::new(
            "test-secret-32-bytes-long-key-01",
            "http://localhost",
            SlackConfig::new("id", "secret"),
        )
        .unwrap();
        let repo = MemoryUserRepository::new();
        let gateway = AuthGateway::new(repo.clone(), MockSlackClient::new(), &config);
        (gateway, repo)
    }

    async fn seed_email_user(repo: &MemoryUserRepository) {
        repo.create_user(NewUser {
            id: "u1".to_owned(),
            org_id: "org1".to_owned(),
            email: "user@example.com".to_owned(),
            name: "User".to_owned(),
            hashed_password: Some(Argon2Hasher::default().hash("pw").unwrap()),
            auth_source: AuthSource::Email,
            status: UserStatus::Active,
            invite_secret_hash: None,
            teams: HashSet::new(),
        })
        .await
        .unwrap();
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(
            extract_bearer_token(&bearer("abc")).as_deref(),
            Some("abc")
        );

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_settings_anonymous_union() {
        let (gateway, _) = gateway();

        match gateway.settings(&HeaderMap::new()) {
            SettingsResponse::Anonymous { email, slack } => {
                assert!(!email.links.is_empty());
                assert!(!slack.links.is_empty());
            }
            SettingsResponse::Authenticated { .. } => panic!("expected anonymous settings"),
        }
    }

    #[tokio::test]
    async fn test_settings_undecodable_token_falls_back_to_anonymous() {
        let (gateway, _) = gateway();
        let response = gateway.settings(&bearer("garbage"));
        assert!(matches!(response, SettingsResponse::Anonymous { .. }));
    }

    #[tokio::test]
    async fn test_settings_authed_routes_by_source() {
        let (gateway, repo) = gateway();
        seed_email_user(&repo).await;

        let (_, token) = gateway
            .email_provider()
            .authenticate("user@example.com", &"pw".into())
            .await
            .unwrap();

        match gateway.settings(&bearer(&token)) {
            SettingsResponse::Authenticated { source, settings } => {
                assert_eq!(source, AuthSource::Email);
                assert!(settings
                    .links
                    .iter()
                    .any(|l| l.href.ends_with("/email/refresh-token")));
            }
            SettingsResponse::Anonymous { .. } => panic!("expected authenticated settings"),
        }
    }

    #[tokio::test]
    async fn test_refresh_source_mismatch() {
        let (gateway, repo) = gateway();
        seed_email_user(&repo).await;

        let (_, token) = gateway
            .email_provider()
            .authenticate("user@example.com", &"pw".into())
            .await
            .unwrap();

        // an email token cannot refresh at the slack route
        let result = gateway.refresh(&bearer(&token), AuthSource::Slack).await;
        assert_eq!(result.unwrap_err(), AuthError::TokenInvalid);
    }

    #[tokio::test]
    async fn test_refresh_is_functionally_idempotent() {
        let (gateway, repo) = gateway();
        seed_email_user(&repo).await;

        let (_, token) = gateway
            .email_provider()
            .authenticate("user@example.com", &"pw".into())
            .await
            .unwrap();

        let first = gateway.refresh(&bearer(&token), AuthSource::Email).await.unwrap();
        let second = gateway.refresh(&bearer(&token), AuthSource::Email).await.unwrap();

        let a = gateway.codec().decode(&first).unwrap();
        let b = gateway.codec().decode(&second).unwrap();
        assert_eq!(a.sub, b.sub);
        assert_eq!(a.org, b.org);
        assert_eq!(a.teams, b.teams);
        assert_eq!(a.name, b.name);
    }

    #[tokio::test]
    async fn test_refresh_missing_token() {
        let (gateway, _) = gateway();
        let result = gateway.refresh(&HeaderMap::new(), AuthSource::Email).await;
        assert_eq!(result.unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_test_token_report() {
        let (gateway, _) = gateway();
        let report = gateway.test_token().unwrap();

        assert!(!report.token.is_empty());
        assert!(report.verified);
        let decoded = report.decoded.unwrap();
        assert_eq!(decoded.sub, "test-user");
        assert_eq!(decoded.org, "test-org");
    }
}
