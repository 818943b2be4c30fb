pub mod change_set;
pub mod user;

pub use change_set::{ChangeSet, UserField};
pub use user::{AccountTier, Gender, Role, User};
