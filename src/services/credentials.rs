use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::errors::AppResult;
use crate::models::{ChangeSet, User};
use crate::utils::{hash_password, verify_password};

/// bcrypt hasher bound to a work factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        hash_password(password, self.cost)
    }
}

/// Replace a freshly supplied plaintext password with its bcrypt hash.
///
/// Does nothing when the password was not touched or has already been hashed
/// for this change set, so running it twice never hashes a hash.
pub fn hash_if_present(user: &mut User, changes: &mut ChangeSet, hasher: &PasswordHasher) -> AppResult<()> {
    if !changes.password_needs_hashing() {
        return Ok(());
    }

    let hashed = hasher.hash(&user.password).map_err(|e| {
        error!(user_id = user.user_id, "Password hashing failed: {}", e);
        e
    })?;
    user.password = hashed;
    changes.mark_password_hashed();

    debug!(user_id = user.user_id, cost = hasher.cost(), "Password hashed");
    Ok(())
}

/// Record `now` as the password change time when an existing record's password changed.
/// Returns whether the stamp was applied.
pub fn stamp_password_change(user: &mut User, changes: &ChangeSet, now: DateTime<Utc>) -> bool {
    if !changes.password_changed() || changes.is_new_record() {
        return false;
    }

    user.password_changed_at = Some(now);
    debug!(user_id = user.user_id, "Password change stamped");
    true
}

/// Compare a plaintext candidate against a stored bcrypt hash.
/// Mismatches and unreadable hashes both yield `false`.
pub fn correct_password(candidate: &str, stored_hash: &str) -> bool {
    match verify_password(candidate, stored_hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

/// Whether the password changed after `issued_at` (seconds since the epoch),
/// meaning anything issued at that time is stale.
pub fn changed_password_after(user: &User, issued_at: i64) -> bool {
    match user.password_changed_at {
        Some(changed_at) => issued_at < changed_at.timestamp(),
        None => false,
    }
}
