use std::collections::HashSet;

use crate::crypto::{generate_token, Argon2Hasher, PasswordHasher, SecretString};
use crate::repository::{AuthSource, NewUser, User, UserRepository, UserStatus};
use crate::token::TokenCodec;
use crate::AuthError;

/// Length of generated user ids.
const USER_ID_LENGTH: usize = 12;

/// Creates a new locally-managed (email) user and issues its first
/// session token. A taken email is a conflict, never an overwrite.
pub struct SignupAction<U: UserRepository> {
    user_repo: U,
    codec: TokenCodec,
}

impl<U: UserRepository> SignupAction<U> {
    pub fn new(user_repo: U, codec: TokenCodec) -> Self {
        Self { user_repo, codec }
    }

    pub async fn execute(
        &self,
        email: &str,
        name: &str,
        password: &SecretString,
        org_id: Option<&str>,
    ) -> Result<(User, String), AuthError> {
        validate_email(email)?;
        if password.expose_secret().len() < 8 {
            return Err(AuthError::Validation(
                "password must be at least 8 characters".to_owned(),
            ));
        }

        if self.user_repo.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let hashed = Argon2Hasher::default().hash(password.expose_secret())?;
        let id = generate_token(USER_ID_LENGTH);
        // signups without an org become the root of their own
        let org_id = org_id
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("org-{id}"));

        let user = self
            .user_repo
            .create_user(NewUser {
                id,
                org_id,
                email: email.to_owned(),
                name: name.to_owned(),
                hashed_password: Some(hashed),
                auth_source: AuthSource::Email,
                status: UserStatus::Active,
                invite_secret_hash: None,
                teams: HashSet::new(),
            })
            .await?;

        let token = self.codec.issue(&user, None)?;

        tracing::info!(user_id = %user.id, org_id = %user.org_id, "email user created");
        Ok((user, token))
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation("invalid email format".to_owned()))
    }
}
