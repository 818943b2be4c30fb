use sqlx::error::ErrorKind;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Hashing failure: {0}")]
    HashingFailure(String),

    /// Covers both a digest mismatch and an expired token.
    #[error("Token is invalid or has expired")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Error codes for callers that need a stable identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConstraintViolation,
    DatabaseError,
    HashingFailure,
    InvalidToken,
    InvalidCredentials,
    NotFound,
    ValidationError,
    ConfigError,
    MigrationError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::HashingFailure => "HASHING_FAILURE",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::MigrationError => "MIGRATION_ERROR",
        }
    }
}

impl AppError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::ConstraintViolation(_) => ErrorCode::ConstraintViolation,
            AppError::DatabaseError(_) => ErrorCode::DatabaseError,
            AppError::HashingFailure(_) => ErrorCode::HashingFailure,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::ConfigError(_) => ErrorCode::ConfigError,
            AppError::MigrationError(_) => ErrorCode::MigrationError,
        }
    }

    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Unique (23505), not-null (23502) and check (23514) violations
pub fn is_constraint_violation(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UniqueViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation
    )
}

// Constraint violations are surfaced separately from generic failures
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if is_constraint_violation(&db_err.kind()) {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return AppError::ConstraintViolation(format!(
                    "{} ({})",
                    db_err.message(),
                    constraint
                ));
            }
        }

        AppError::DatabaseError(err)
    }
}

// Result type alias
pub type AppResult<T> = Result<T, AppError>;
