#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use super::Team;
use crate::AuthError;

/// Input for creating a team.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub id: String,
    pub name: String,
    /// Initial admin. Teams are never created without one.
    pub admin_id: String,
}

/// Store contract for team records.
///
/// `add_admin` and `remove_admin` must be applied as a single
/// conditional write on the team record: concurrent mutations of the
/// same team must not lose updates.
#[async_trait]
pub trait TeamRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Team>, AuthError>;
    async fn list(&self) -> Result<Vec<Team>, AuthError>;
    async fn create(&self, team: NewTeam) -> Result<Team, AuthError>;
    async fn delete(&self, id: &str) -> Result<(), AuthError>;
    /// Atomically inserts `user_id` into the admin set.
    async fn add_admin(&self, team_id: &str, user_id: &str) -> Result<Team, AuthError>;
    /// Atomically removes `user_id` from the admin set. Fails with
    /// `LastAdmin` if the removal would leave the set empty, `NotFound`
    /// if the team is missing or the target is not an admin.
    async fn remove_admin(&self, team_id: &str, user_id: &str) -> Result<Team, AuthError>;
}

/// In-memory team store. The mutex spans each read-check-write, which
/// gives the conditional-update semantics the trait requires.
#[derive(Clone, Default)]
pub struct MemoryTeamRepository {
    pub teams: Arc<Mutex<Vec<Team>>>,
}

impl MemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamRepository for MemoryTeamRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Team>, AuthError> {
        let teams = self.teams.lock().unwrap();
        Ok(teams.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Team>, AuthError> {
        let teams = self.teams.lock().unwrap();
        Ok(teams.clone())
    }

    async fn create(&self, new: NewTeam) -> Result<Team, AuthError> {
        let mut teams = self.teams.lock().unwrap();
        if teams.iter().any(|t| t.id == new.id) {
            return Err(AuthError::Conflict(format!("team {} already exists", new.id)));
        }

        let now = Utc::now();
        let team = Team {
            id: new.id,
            name: new.name,
            admins: std::iter::once(new.admin_id).collect(),
            created_at: now,
            updated_at: now,
        };
        teams.push(team.clone());
        Ok(team)
    }

    async fn delete(&self, id: &str) -> Result<(), AuthError> {
        let mut teams = self.teams.lock().unwrap();
        let len_before = teams.len();
        teams.retain(|t| t.id != id);
        if teams.len() < len_before {
            Ok(())
        } else {
            Err(AuthError::NotFound)
        }
    }

    async fn add_admin(&self, team_id: &str, user_id: &str) -> Result<Team, AuthError> {
        let mut teams = self.teams.lock().unwrap();
        let team = teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(AuthError::NotFound)?;

        team.admins.insert(user_id.to_owned());
        team.updated_at = Utc::now();
        Ok(team.clone())
    }

    async fn remove_admin(&self, team_id: &str, user_id: &str) -> Result<Team, AuthError> {
        let mut teams = self.teams.lock().unwrap();
        let team = teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(AuthError::NotFound)?;

        if !team.admins.contains(user_id) {
            return Err(AuthError::NotFound);
        }
        if team.admins.len() == 1 {
            return Err(AuthError::LastAdmin);
        }

        team.admins.remove(user_id);
        team.updated_at = Utc::now();
        Ok(team.clone())
    }
}
