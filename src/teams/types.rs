use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A team within an organization.
///
/// Invariant: every id in `admins` is currently a member of the team
/// (present in some user's `teams` set). `add_admin` enforces this on
/// the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// User ids allowed to manage this team.
    pub admins: HashSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
