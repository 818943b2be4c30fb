use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::errors::{AppError, AppResult};
use crate::models::{ChangeSet, User, UserField};

const OPAQUE_TOKEN_BYTES: usize = 32;

/// How the plaintext reset token is delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetTokenMode {
    /// Four digits, for SMS.
    #[default]
    Numeric,
    /// 32 random bytes as hex, for links.
    Opaque,
}

impl ResetTokenMode {
    fn generate(self) -> String {
        match self {
            ResetTokenMode::Numeric => OsRng.gen_range(1000..=9999).to_string(),
            ResetTokenMode::Opaque => {
                let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
                OsRng.fill_bytes(&mut bytes);
                hex::encode(bytes)
            }
        }
    }
}

/// Whether `token` has the shape of an opaque (link) token: 64 hex characters.
pub fn is_opaque_token(token: &str) -> bool {
    token.len() == OPAQUE_TOKEN_BYTES * 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}

/// SHA-256 hex digest stored in place of a reset token
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Debug, Clone, Copy)]
pub struct ResetTokenIssuer {
    ttl: Duration,
}

impl Default for ResetTokenIssuer {
    fn default() -> Self {
        Self::new(Duration::minutes(10))
    }
}

impl ResetTokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Issue a one-time token: its digest and expiry go on the record (unsaved),
    /// the plaintext goes back to the caller and nowhere else.
    pub fn create_password_reset_token(&self, user: &mut User, mode: ResetTokenMode, now: DateTime<Utc>) -> String {
        let token = mode.generate();
        user.password_reset_token = Some(hash_reset_token(&token));
        user.password_reset_expires = Some(now + self.ttl);
        token
    }
}

/// Check a candidate against the stored digest and expiry.
/// Every failure maps to the same `InvalidToken`.
pub fn verify_reset_token(user: &User, candidate: &str, now: DateTime<Utc>) -> AppResult<()> {
    let (Some(stored), Some(expires)) = (&user.password_reset_token, user.password_reset_expires) else {
        return Err(AppError::InvalidToken);
    };

    let digest_matches = hash_reset_token(candidate) == *stored;
    let still_valid = now < expires;

    if digest_matches && still_valid {
        Ok(())
    } else {
        warn!(user_id = user.user_id, "Rejected password reset token");
        Err(AppError::InvalidToken)
    }
}

pub fn clear_reset_token(user: &mut User, changes: &mut ChangeSet) {
    user.password_reset_token = None;
    user.password_reset_expires = None;
    changes.mark(UserField::PasswordResetToken);
    changes.mark(UserField::PasswordResetExpires);
}

/// Consume a reset token and install `new_password` (still plaintext; the
/// update pipeline hashes it). The returned change set must go through the
/// pipeline before the record is saved.
pub fn complete_password_reset(
    user: &mut User,
    candidate: &str,
    new_password: &str,
    now: DateTime<Utc>,
) -> AppResult<ChangeSet> {
    verify_reset_token(user, candidate, now)?;

    let mut changes = ChangeSet::for_update();
    user.password = new_password.to_string();
    changes.mark(UserField::Password);
    clear_reset_token(user, &mut changes);

    Ok(changes)
}
