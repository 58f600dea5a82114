//! Identity providers.
//!
//! Exactly two variants exist: local email/password and Slack SSO. The
//! gateway selects one by matching on [`crate::AuthSource`] at
//! token-decode time; there is no string-keyed dispatch.

mod email;
mod slack;

pub use email::EmailProvider;
pub use slack::{HttpSlackClient, MockSlackClient, SlackClient, SlackIdentity, SlackProvider};

use serde::{Deserialize, Serialize};

/// A capability link advertised in settings payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsLink {
    pub rel: String,
    pub href: String,
}

impl SettingsLink {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }
}

/// What a provider advertises to a caller: public capabilities for
/// anonymous requests, user-scoped links for authenticated ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub links: Vec<SettingsLink>,
}
