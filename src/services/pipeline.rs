use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::AppResult;
use crate::models::{ChangeSet, User};
use crate::services::credentials::{hash_if_present, stamp_password_change, PasswordHasher};
use crate::services::points::apply_points;

/// Steps every create and update goes through before it is written:
/// points recompute, password hash, password-change stamp.
#[derive(Debug, Clone, Copy)]
pub struct UpdatePipeline {
    hasher: PasswordHasher,
}

impl UpdatePipeline {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self { hasher }
    }

    /// Takes the record by value and only hands it back once every step has
    /// succeeded, so a failed run leaves nothing to commit.
    pub fn apply(&self, mut user: User, changes: &mut ChangeSet, now: DateTime<Utc>) -> AppResult<User> {
        apply_points(&mut user);
        hash_if_present(&mut user, changes, &self.hasher)?;
        let stamped = stamp_password_change(&mut user, changes, now);

        if !changes.is_new_record() {
            user.updated_at = now;
        }

        debug!(
            user_id = user.user_id,
            points = user.points,
            password_stamped = stamped,
            "Update pipeline applied"
        );
        Ok(user)
    }
}
