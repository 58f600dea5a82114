use crate::teams::{ensure_admin, TeamRepository};
use crate::AuthError;

/// Deletes a team. Gated on the acting user being a team admin.
pub struct DeleteTeamAction<T: TeamRepository> {
    team_repo: T,
}

impl<T: TeamRepository> DeleteTeamAction<T> {
    pub fn new(team_repo: T) -> Self {
        Self { team_repo }
    }

    pub async fn execute(&self, team_id: &str, acting_user_id: &str) -> Result<(), AuthError> {
        let team = self
            .team_repo
            .find_by_id(team_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        ensure_admin(&team, acting_user_id)?;

        self.team_repo.delete(team_id).await?;

        tracing::info!(team_id, acting_user_id, "team deleted");
        Ok(())
    }
}
