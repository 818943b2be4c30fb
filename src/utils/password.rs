use bcrypt::{hash, verify};

use crate::errors::AppError;

/// bcrypt only reads this many bytes of input; anything longer is refused
/// rather than silently cut.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt with the given work factor
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::HashingFailure(format!(
            "Password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    hash(password, cost).map_err(|e| AppError::HashingFailure(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a bcrypt hash. Candidates longer than bcrypt
/// can read never match.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }

    verify(password, hash).map_err(|e| AppError::HashingFailure(format!("Failed to verify password: {}", e)))
}
