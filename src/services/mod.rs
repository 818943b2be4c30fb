pub mod credentials;
pub mod pipeline;
pub mod points;
pub mod reset_token;
pub mod user_repository;
pub mod user_service;

pub use credentials::{changed_password_after, correct_password, hash_if_present, stamp_password_change, PasswordHasher};
pub use pipeline::UpdatePipeline;
pub use points::{recompute_points, tier_weight};
pub use reset_token::{
    clear_reset_token, complete_password_reset, hash_reset_token, is_opaque_token, verify_reset_token, ResetTokenIssuer,
    ResetTokenMode,
};
pub use user_repository::{PgUserRepository, UserRepository};
pub use user_service::UserService;
