use crate::teams::{ensure_admin, Team, TeamRepository};
use crate::AuthError;

/// Demotes a team admin. The caller must be an admin; the store refuses
/// to remove the last remaining admin.
pub struct RemoveAdminAction<T: TeamRepository> {
    team_repo: T,
}

impl<T: TeamRepository> RemoveAdminAction<T> {
    pub fn new(team_repo: T) -> Self {
        Self { team_repo }
    }

    pub async fn execute(
        &self,
        team_id: &str,
        target_user_id: &str,
        acting_user_id: &str,
    ) -> Result<Team, AuthError> {
        let team = self
            .team_repo
            .find_by_id(team_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        ensure_admin(&team, acting_user_id)?;

        let team = self.team_repo.remove_admin(team_id, target_user_id).await?;

        tracing::info!(team_id, target_user_id, acting_user_id, "team admin removed");
        Ok(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teams::{MemoryTeamRepository, NewTeam};

    async fn seed_team(repo: &MemoryTeamRepository, extra_admin: Option<&str>) {
        repo.create(NewTeam {
            id: "t1".to_owned(),
            name: "Team One".to_owned(),
            admin_id: "admin".to_owned(),
        })
        .await
        .unwrap();
        if let Some(id) = extra_admin {
            repo.add_admin("t1", id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_remove_admin() {
        let repo = MemoryTeamRepository::new();
        seed_team(&repo, Some("second")).await;

        let action = RemoveAdminAction::new(repo);
        let team = action.execute("t1", "second", "admin").await.unwrap();

        assert!(!team.admins.contains("second"));
        assert!(team.admins.contains("admin"));
    }

    #[tokio::test]
    async fn test_admins_can_remove_themselves() {
        let repo = MemoryTeamRepository::new();
        seed_team(&repo, Some("second")).await;

        let action = RemoveAdminAction::new(repo);
        let team = action.execute("t1", "admin", "admin").await.unwrap();
        assert!(!team.admins.contains("admin"));
    }

    #[tokio::test]
    async fn test_last_admin_protected() {
        let repo = MemoryTeamRepository::new();
        seed_team(&repo, None).await;

        let action = RemoveAdminAction::new(repo);
        let result = action.execute("t1", "admin", "admin").await;

        assert_eq!(result.unwrap_err(), AuthError::LastAdmin);
    }

    #[tokio::test]
    async fn test_non_admin_caller_rejected() {
        let repo = MemoryTeamRepository::new();
        seed_team(&repo, Some("second")).await;

        let action = RemoveAdminAction::new(repo);
        let result = action.execute("t1", "second", "stranger").await;

        assert_eq!(result.unwrap_err(), AuthError::Forbidden);
    }
}
