use crate::repository::{User, UserRepository};
use crate::AuthError;

/// Enumerates an organization's users, excluding the caller.
pub struct ListOrgUsersAction<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> ListOrgUsersAction<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, org_id: &str, caller_id: &str) -> Result<Vec<User>, AuthError> {
        let users = self.user_repo.list_users_by_org(org_id).await?;
        Ok(users.into_iter().filter(|u| u.id != caller_id).collect())
    }
}
