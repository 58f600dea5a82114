use super::Team;
use crate::AuthError;

/// True iff `user_id` is in the team's admin set. Non-members and
/// ordinary members both fail this check.
pub fn is_admin(team: &Team, user_id: &str) -> bool {
    team.admins.contains(user_id)
}

/// Precondition gate for mutating team operations.
pub fn ensure_admin(team: &Team, user_id: &str) -> Result<(), AuthError> {
    if is_admin(team, user_id) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;

    fn team_with_admins(admins: &[&str]) -> Team {
        Team {
            id: "team-1".to_owned(),
            name: "Team One".to_owned(),
            admins: admins.iter().map(|s| (*s).to_owned()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_admin() {
        let team = team_with_admins(&["u1", "u2"]);
        assert!(is_admin(&team, "u1"));
        assert!(is_admin(&team, "u2"));
        assert!(!is_admin(&team, "u3"));
        assert!(!is_admin(&team, ""));
    }

    #[test]
    fn test_empty_admin_set() {
        let team = Team {
            admins: HashSet::new(),
            ..team_with_admins(&[])
        };
        assert!(!is_admin(&team, "u1"));
    }

    #[test]
    fn test_ensure_admin() {
        let team = team_with_admins(&["u1"]);
        assert!(ensure_admin(&team, "u1").is_ok());
        assert_eq!(ensure_admin(&team, "u2").unwrap_err(), AuthError::Forbidden);
    }
}
