//! Teams and team-admin authorization.
//!
//! A team's `admins` set is the subset of its members allowed to manage
//! it. Admin checks are a precondition gate in front of every mutating
//! team operation; admin-set mutations are atomic conditional writes at
//! the store layer.

pub mod actions;
mod authorize;
mod repository;
mod types;

pub use authorize::{ensure_admin, is_admin};
pub use repository::{MemoryTeamRepository, NewTeam, TeamRepository};
pub use types::Team;
