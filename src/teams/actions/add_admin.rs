use crate::repository::UserRepository;
use crate::teams::{ensure_admin, Team, TeamRepository};
use crate::AuthError;

/// Promotes a team member to admin.
///
/// Check order is fixed: team exists, caller is an admin, target is a
/// current member. Only then does the store apply the atomic insert.
pub struct AddAdminAction<T: TeamRepository, U: UserRepository> {
    team_repo: T,
    user_repo: U,
}

impl<T: TeamRepository, U: UserRepository> AddAdminAction<T, U> {
    pub fn new(team_repo: T, user_repo: U) -> Self {
        Self { team_repo, user_repo }
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

        let target = self
            .user_repo
            .find_user_by_id(target_user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !target.is_member_of(team_id) {
            return Err(AuthError::NotTeamMember);
        }

        let team = self.team_repo.add_admin(team_id, target_user_id).await?;

        tracing::info!(team_id, target_user_id, acting_user_id, "team admin added");
        Ok(team)
    }
}
