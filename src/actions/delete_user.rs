use crate::repository::UserRepository;
use crate::AuthError;

/// Deletes a user within an organization. A target that exists in a
/// different organization is indistinguishable from an absent one.
pub struct DeleteUserAction<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> DeleteUserAction<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, org_id: &str, user_id: &str) -> Result<(), AuthError> {
        let user = self
            .user_repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if user.org_id != org_id {
            return Err(AuthError::NotFound);
        }

        self.user_repo.delete_user(user_id).await?;

        tracing::info!(user_id, org_id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{AuthSource, MemoryUserRepository, NewUser, UserStatus};
    use std::collections::HashSet;

    async fn seed(repo: &MemoryUserRepository, id: &str, org: &str) {
        repo.create_user(NewUser {
            id: id.to_owned(),
            org_id: org.to_owned(),
            email: format!("{id}@example.com"),
            name: id.to_owned(),
            hashed_password: None,
            auth_source: AuthSource::Email,
            status: UserStatus::Active,
            invite_secret_hash: None,
            teams: HashSet::new(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_delete_in_org() {
        let repo = MemoryUserRepository::new();
        seed(&repo, "u1", "org1").await;

        let action = DeleteUserAction::new(repo.clone());
        action.execute("org1", "u1").await.unwrap();
        assert!(repo.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_across_orgs_looks_absent() {
        let repo = MemoryUserRepository::new();
        seed(&repo, "u1", "org2").await;

        let action = DeleteUserAction::new(repo.clone());
        let result = action.execute("org1", "u1").await;

        assert_eq!(result.unwrap_err(), AuthError::NotFound);
        assert_eq!(repo.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let action = DeleteUserAction::new(MemoryUserRepository::new());
        assert_eq!(action.execute("org1", "ghost").await.unwrap_err(), AuthError::NotFound);
    }
}
