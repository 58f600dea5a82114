#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::AuthError;

use super::user::{NewUser, User, UserRepository, UserStatus};

/// In-memory user store. Backs the demo binary and every test; a
/// persistent store implements the same trait.
#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users_by_org(&self, org_id: &str) -> Result<Vec<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().filter(|u| u.org_id == org_id).cloned().collect())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new.email || u.id == new.id) {
            return Err(AuthError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: new.id,
            org_id: new.org_id,
            email: new.email,
            name: new.name,
            hashed_password: new.hashed_password,
            auth_source: new.auth_source,
            status: new.status,
            invite_secret_hash: new.invite_secret_hash,
            teams: new.teams,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_invite_secret(
        &self,
        user_id: &str,
        secret_hash: &str,
    ) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.invite_secret_hash = Some(secret_hash.to_owned());
            user.updated_at = Utc::now();
            Ok(user.clone())
        } else {
            Err(AuthError::NotFound)
        }
    }

    async fn activate_user(&self, user_id: &str) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.status = UserStatus::Active;
            user.invite_secret_hash = None;
            user.updated_at = Utc::now();
            Ok(user.clone())
        } else {
            Err(AuthError::NotFound)
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap();
        let len_before = users.len();
        users.retain(|u| u.id != user_id);
        if users.len() < len_before {
            Ok(())
        } else {
            Err(AuthError::NotFound)
        }
    }
}
