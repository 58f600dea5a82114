use std::collections::HashSet;

use crate::crypto::{
    generate_token, generate_token_default, hash_token, Argon2Hasher, PasswordHasher, SecretString,
};
use crate::repository::{AuthSource, NewUser, User, UserRepository, UserStatus};
use crate::AuthError;

/// Length of generated user ids.
const USER_ID_LENGTH: usize = 12;

/// Result of an invite: the pending user and the one-time secret. The
/// secret is returned exactly once and stored only as a hash.
#[derive(Debug)]
pub struct InviteOutcome {
    pub user: User,
    pub secret: SecretString,
    /// False when this was a re-invite of an existing pending user.
    pub created: bool,
}

/// Creates or re-invites a pending email user within an organization.
///
/// Re-invites rotate the one-time secret and are only allowed while the
/// user is still pending and still in the same organization:
/// - already activated: conflict, activation ended re-invite eligibility
/// - belongs to a different organization: conflict; cross-org re-invite
///   is rejected rather than merged
/// - a requested target user-id that doesn't resolve to the same user:
///   not found
pub struct InviteAction<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> InviteAction<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    pub async fn execute(
        &self,
        org_id: &str,
        email: &str,
        target_user_id: Option<&str>,
    ) -> Result<InviteOutcome, AuthError> {
        let existing = self.user_repo.find_user_by_email(email).await?;

        match existing {
            None => {
                if target_user_id.is_some() {
                    // caller asked to re-invite a specific user that
                    // doesn't resolve to this email
                    return Err(AuthError::NotFound);
                }
                self.create_pending(org_id, email).await
            }
            Some(user) => {
                if let Some(target) = target_user_id {
                    if target != user.id {
                        return Err(AuthError::NotFound);
                    }
                }
                if user.org_id != org_id {
                    return Err(AuthError::Conflict(
                        "user already belongs to a different organization".to_owned(),
                    ));
                }
                if !user.is_pending() {
                    return Err(AuthError::AlreadyActivated);
                }
                self.reinvite(user).await
            }
        }
    }

    async fn create_pending(&self, org_id: &str, email: &str) -> Result<InviteOutcome, AuthError> {
        let secret = generate_token_default();
        // random placeholder; never delivered, so the account is
        // unusable for password login until activation
        let placeholder = Argon2Hasher::default().hash(&generate_token_default())?;

        let user = self
            .user_repo
            .create_user(NewUser {
                id: generate_token(USER_ID_LENGTH),
                org_id: org_id.to_owned(),
                email: email.to_owned(),
                name: email.to_owned(),
                hashed_password: Some(placeholder),
                auth_source: AuthSource::Email,
                status: UserStatus::Pending,
                invite_secret_hash: Some(hash_token(&secret)),
                teams: HashSet::new(),
            })
            .await?;

        tracing::info!(user_id = %user.id, org_id, "pending user invited");

        Ok(InviteOutcome {
            user,
            secret: SecretString::new(secret),
            created: true,
        })
    }

    async fn reinvite(&self, user: User) -> Result<InviteOutcome, AuthError> {
        let secret = generate_token_default();
        let user = self
            .user_repo
            .update_invite_secret(&user.id, &hash_token(&secret))
            .await?;

        tracing::info!(user_id = %user.id, org_id = %user.org_id, "pending user re-invited");

        Ok(InviteOutcome {
            user,
            secret: SecretString::new(secret),
            created: false,
        })
    }
}
