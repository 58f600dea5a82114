//! One struct per operation, constructed with the repositories it
//! needs and executed per request.

mod delete_user;
mod invite;
mod list_users;
mod signup;

pub use delete_user::DeleteUserAction;
pub use invite::{InviteAction, InviteOutcome};
pub use list_users::ListOrgUsersAction;
pub use signup::SignupAction;
