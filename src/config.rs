//! Process-wide configuration.
//!
//! One immutable [`GatewayConfig`] is constructed at startup and passed
//! explicitly to every component that needs it. Core logic never reads
//! the environment itself; only [`GatewayConfig::from_env`] does, and a
//! missing or undersized signing secret is fatal there, not a
//! per-request error.

use chrono::Duration;
use std::fmt;

use crate::crypto::SecretString;
use crate::AuthError;

/// Minimum required length for the HS256 signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Default session token lifetime.
const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Configuration for the Slack identity provider.
#[derive(Clone)]
pub struct SlackConfig {
    /// OAuth client id, advertised in anonymous settings.
    pub client_id: String,
    /// OAuth client secret, used for the code exchange.
    pub client_secret: SecretString,
    /// Base URL of the Slack Web API.
    pub api_base: String,
    /// URL the anonymous settings point users at to start the OAuth flow.
    pub authorize_url: String,
    /// Bound on every outbound provider call.
    pub timeout: std::time::Duration,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("authorize_url", &self.authorize_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SlackConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        let client_id = client_id.into();
        let authorize_url = format!(
            "https://slack.com/oauth/authorize?client_id={client_id}&scope=identity.basic"
        );
        Self {
            client_id,
            client_secret: SecretString::new(client_secret),
            api_base: "https://slack.com/api".to_owned(),
            authorize_url,
            timeout: std::time::Duration::from_secs(5),
        }
    }

    /// Overrides the Slack API base URL (used by tests and proxies).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Immutable configuration shared across the whole process.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Secret key used for signing session tokens (HS256).
    pub(crate) secret: SecretString,
    /// Session token lifetime. Default: 24 hours.
    pub(crate) token_expiry: Duration,
    /// Public base URL used to build settings links and Location headers.
    pub base_url: String,
    pub slack: SlackConfig,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("secret", &"[REDACTED]")
            .field("token_expiry", &self.token_expiry)
            .field("base_url", &self.base_url)
            .field("slack", &self.slack)
            .finish()
    }
}

impl GatewayConfig {
    /// Creates a configuration with the given signing secret.
    ///
    /// # Errors
    /// Returns `AuthError::ConfigurationError` if the secret is shorter
    /// than [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(
        secret: impl Into<String>,
        base_url: impl Into<String>,
        slack: SlackConfig,
    ) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::ConfigurationError(format!(
                "signing secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        Ok(Self {
            secret: SecretString::new(secret),
            token_expiry: Duration::hours(DEFAULT_TOKEN_EXPIRY_HOURS),
            base_url: base_url.into(),
            slack,
        })
    }

    /// Sets the session token lifetime.
    #[must_use]
    pub fn with_token_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }

    pub fn token_expiry(&self) -> Duration {
        self.token_expiry
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Builds the configuration from environment variables.
    ///
    /// Required: `GATEHOUSE_SECRET`, `SLACK_CLIENT_ID`, `SLACK_CLIENT_SECRET`.
    /// Optional: `GATEHOUSE_BASE_URL` (default `http://localhost:8080`),
    /// `GATEHOUSE_TOKEN_EXPIRY_HOURS`.
    ///
    /// # Errors
    /// Returns `AuthError::ConfigurationError` when a required variable
    /// is absent or the secret is too short. Callers treat this as fatal.
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = require_env("GATEHOUSE_SECRET")?;
        let client_id = require_env("SLACK_CLIENT_ID")?;
        let client_secret = require_env("SLACK_CLIENT_SECRET")?;
        let base_url = std::env::var("GATEHOUSE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_owned());

        let mut config = Self::new(secret, base_url, SlackConfig::new(client_id, client_secret))?;

        if let Ok(hours) = std::env::var("GATEHOUSE_TOKEN_EXPIRY_HOURS") {
            let hours: i64 = hours.parse().map_err(|_| {
                AuthError::ConfigurationError(
                    "GATEHOUSE_TOKEN_EXPIRY_HOURS must be an integer".to_owned(),
                )
            })?;
            config.token_expiry = Duration::hours(hours);
        }

        Ok(config)
    }
}

fn require_env(name: &str) -> Result<String, AuthError> {
    std::env::var(name)
        .map_err(|_| AuthError::ConfigurationError(format!("missing environment variable {name}")))
}
