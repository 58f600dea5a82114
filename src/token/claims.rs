use serde::{Deserialize, Serialize};

use crate::repository::{AuthSource, User};

/// Claims embedded in a session token.
///
/// A point-in-time projection of a [`User`] record. It can go stale;
/// staleness is resolved by re-reading the store on refresh, never
/// assumed away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - the user id.
    pub sub: String,
    /// Organization (tenant) the user belonged to at issuance.
    pub org: String,
    /// Which provider produced this session.
    pub src: AuthSource,
    /// Team memberships at issuance time.
    pub teams: Vec<String>,
    /// Display name.
    pub name: String,
    /// Slack access token, carried so SSO refresh can revalidate it
    /// against the provider. Absent for email sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
}

impl SessionClaims {
    /// Projects a user record into claims. `exp`/`iat` are filled in by
    /// the codec at signing time.
    pub fn from_user(user: &User, access_token: Option<String>) -> Self {
        let mut teams: Vec<String> = user.teams.iter().cloned().collect();
        teams.sort();

        Self {
            sub: user.id.clone(),
            org: user.org_id.clone(),
            src: user.auth_source,
            teams,
            name: user.name.clone(),
            access_token,
            exp: 0,
            iat: 0,
        }
    }
}
