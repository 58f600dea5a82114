mod user;
mod user_memory;

pub use user::{AuthSource, NewUser, User, UserRepository, UserStatus};
pub use user_memory::MemoryUserRepository;
