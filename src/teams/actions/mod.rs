mod add_admin;
mod delete_team;
mod remove_admin;

pub use add_admin::AddAdminAction;
pub use delete_team::DeleteTeamAction;
pub use remove_admin::RemoveAdminAction;
