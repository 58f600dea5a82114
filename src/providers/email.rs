use super::{ProviderSettings, SettingsLink};
use crate::crypto::{PasswordHasher, SecretString};
use crate::repository::{User, UserRepository};
use crate::token::{SessionClaims, TokenCodec};
use crate::AuthError;

/// Local email/password identity provider.
pub struct EmailProvider<U: UserRepository> {
    user_repo: U,
    codec: TokenCodec,
    base_url: String,
}

impl<U: UserRepository> EmailProvider<U> {
    pub fn new(user_repo: U, codec: TokenCodec, base_url: impl Into<String>) -> Self {
        Self {
            user_repo,
            codec,
            base_url: base_url.into(),
        }
    }

    /// Verifies credentials against the stored hash and issues a token.
    ///
    /// Pending invitees carry an unusable placeholder password, so they
    /// fail here until activated.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<(User, String), AuthError> {
        let user = self.user_repo.find_user_by_email(email).await?;

        if let Some(user) = user {
            let hashed = user.hashed_password.as_deref();
            if let Some(hashed) = hashed {
                let hasher = crate::crypto::Argon2Hasher::default();
                if hasher.verify(password.expose_secret(), hashed)? {
                    let token = self.codec.issue(&user, None)?;
                    return Ok((user, token));
                }
            }
        }
        Err(AuthError::InvalidCredentials)
    }

    /// Static public capability advertisement.
    pub fn anonymous_settings(&self) -> ProviderSettings {
        ProviderSettings {
            links: vec![
                SettingsLink::new("authenticate", format!("{}/email/auth", self.base_url)),
                SettingsLink::new("create", format!("{}/email/users", self.base_url)),
            ],
        }
    }

    /// User-scoped links for an authenticated email session.
    pub fn authed_settings(&self, claims: &SessionClaims) -> ProviderSettings {
        ProviderSettings {
            links: vec![
                SettingsLink::new("refresh", format!("{}/email/refresh-token", self.base_url)),
                SettingsLink::new(
                    "org-users",
                    format!("{}/org/{}/users", self.base_url, claims.org),
                ),
                SettingsLink::new("teams", format!("{}/teams", self.base_url)),
            ],
        }
    }

    /// Reissues a token, but only if the user still exists and still
    /// belongs to the organization the claims were issued for.
    /// Anything else is a stale identity, not a soft success.
    pub async fn refresh(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        let user = self
            .user_repo
            .find_user_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::StaleIdentity)?;

        if user.org_id != claims.org {
            tracing::warn!(
                user_id = %claims.sub,
                token_org = %claims.org,
                store_org = %user.org_id,
                "refresh rejected: organization changed since issuance"
            );
            return Err(AuthError::StaleIdentity);
        }

        // fresh projection: current teams and name, new expiry
        self.codec.issue(&user, None)
    }
}
