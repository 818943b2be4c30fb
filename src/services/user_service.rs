use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::dto::{CreateUserRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, UpdateUserRequest};
use crate::errors::{AppError, AppResult};
use crate::models::{ChangeSet, User, UserField};
use crate::services::credentials::{changed_password_after, correct_password, PasswordHasher};
use crate::services::pipeline::UpdatePipeline;
use crate::services::reset_token::{complete_password_reset, hash_reset_token, is_opaque_token, ResetTokenIssuer};
use crate::services::user_repository::UserRepository;
use crate::utils::validate_request;

/// Account operations over a caller-owned repository handle
pub struct UserService<R: UserRepository> {
    repo: R,
    pipeline: UpdatePipeline,
    reset_tokens: ResetTokenIssuer,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R, config: &AppConfig) -> Self {
        Self {
            repo,
            pipeline: UpdatePipeline::new(PasswordHasher::new(config.bcrypt_cost)),
            reset_tokens: ResetTokenIssuer::new(Duration::minutes(config.reset_token_ttl_minutes)),
        }
    }

    /// Run the update pipeline off the async executor; bcrypt is CPU bound.
    async fn run_pipeline(&self, user: User, mut changes: ChangeSet) -> AppResult<User> {
        let pipeline = self.pipeline;
        tokio::task::spawn_blocking(move || pipeline.apply(user, &mut changes, Utc::now()))
            .await
            .map_err(|e| AppError::HashingFailure(format!("Update pipeline did not complete: {}", e)))?
    }

    /// Register a new user
    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<User> {
        validate_request(&request)?;

        let user = self.run_pipeline(request.into_user(), ChangeSet::for_insert()).await?;
        let inserted = self.repo.insert(&user).await?;

        info!(user_id = inserted.user_id, "User created");
        Ok(inserted)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i32) -> AppResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Update user
    pub async fn update_user(&self, user_id: i32, request: UpdateUserRequest) -> AppResult<User> {
        validate_request(&request)?;

        let mut user = self.get_user(user_id).await?;
        let changes = request.apply_to(&mut user);

        let user = self.run_pipeline(user, changes).await?;
        let updated = self.repo.update(&user).await?;

        info!(user_id = updated.user_id, "User updated");
        Ok(updated)
    }

    /// Check an email/password pair. Unknown emails and wrong passwords fail the same way.
    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<User> {
        validate_request(&request)?;

        let user = self
            .repo
            .find_by_email(&request.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let stored_hash = user.password.clone();
        let is_valid = tokio::task::spawn_blocking(move || correct_password(&request.password, &stored_hash))
            .await
            .map_err(|e| AppError::HashingFailure(format!("Password verification did not complete: {}", e)))?;

        if !is_valid {
            warn!(user_id = user.user_id, "Rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Whether a credential issued at `issued_at` (epoch seconds) predates the last password change
    pub async fn is_token_stale(&self, user_id: i32, issued_at: i64) -> AppResult<bool> {
        let user = self.get_user(user_id).await?;
        Ok(changed_password_after(&user, issued_at))
    }

    /// Issue a reset token and persist its digest. The plaintext is returned for out-of-band delivery.
    pub async fn request_password_reset(&self, request: ForgotPasswordRequest) -> AppResult<String> {
        validate_request(&request)?;

        let mut user = self
            .repo
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let token = self
            .reset_tokens
            .create_password_reset_token(&mut user, request.mode, Utc::now());

        let mut changes = ChangeSet::for_update();
        changes.mark(UserField::PasswordResetToken);
        changes.mark(UserField::PasswordResetExpires);

        let user = self.run_pipeline(user, changes).await?;
        self.repo.update(&user).await?;

        info!(user_id = user.user_id, mode = ?request.mode, "Password reset token issued");
        Ok(token)
    }

    /// Redeem a reset token, set the new password and clear the token.
    ///
    /// Without an email only opaque tokens are looked up; a four-digit code
    /// alone would let anyone sweep the whole code space across accounts.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<User> {
        validate_request(&request)?;

        let user = match &request.email {
            Some(email) => self.repo.find_by_email(email).await?,
            None if is_opaque_token(&request.token) => {
                self.repo.find_by_reset_token(&hash_reset_token(&request.token)).await?
            }
            None => {
                warn!("Rejected password reset without email for a non-opaque token");
                return Err(AppError::InvalidToken);
            }
        };
        let mut user = user.ok_or(AppError::InvalidToken)?;

        let changes = complete_password_reset(&mut user, &request.token, &request.password, Utc::now())?;

        let user = self.run_pipeline(user, changes).await?;
        let updated = self.repo.update(&user).await?;

        info!(user_id = updated.user_id, "Password reset completed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountTier;
    use crate::services::reset_token::{verify_reset_token, ResetTokenMode};
    use crate::services::user_repository::MockUserRepository;

    fn test_config() -> AppConfig {
        AppConfig {
            bcrypt_cost: 4,
            ..AppConfig::default()
        }
    }

    fn create_request() -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Test".into(),
            last_name: "User".into(),
            phone: "0700000000".into(),
            dob: None,
            nic: None,
            email: "test@example.com".into(),
            gender: None,
            img_link: None,
            role: None,
            account_tier: None,
            password: "initial-password".into(),
        }
    }

    fn stored_user(password: &str) -> User {
        let mut user = create_request().into_user();
        user.user_id = 1;
        user.password = PasswordHasher::new(4).hash(password).unwrap();
        user
    }

    fn echo_update(repo: &mut MockUserRepository) {
        repo.expect_update().times(1).returning(|user| Ok(user.clone()));
    }

    #[tokio::test]
    async fn create_user_hashes_before_insert() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert()
            .withf(|user| user.password != "initial-password" && user.password_changed_at.is_none())
            .times(1)
            .returning(|user| {
                let mut inserted = user.clone();
                inserted.user_id = 1;
                Ok(inserted)
            });
        let service = UserService::new(repo, &test_config());

        let user = service.create_user(create_request()).await.unwrap();

        assert_eq!(user.user_id, 1);
        assert_eq!(user.points, 0.33);
        assert!(correct_password("initial-password", &user.password));
    }

    #[tokio::test]
    async fn create_user_surfaces_constraint_violations() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert()
            .returning(|_| Err(AppError::ConstraintViolation("users_email_key".into())));
        let service = UserService::new(repo, &test_config());

        let err = service.create_user(create_request()).await.unwrap_err();

        assert!(matches!(err, AppError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn create_user_validates_before_touching_storage() {
        let repo = MockUserRepository::new();
        let service = UserService::new(repo, &test_config());
        let mut request = create_request();
        request.email = "nope".into();

        let err = service.create_user(request).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_user_recomputes_points_and_stamps_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(stored_user("initial-password"))));
        echo_update(&mut repo);
        let service = UserService::new(repo, &test_config());

        let request = UpdateUserRequest {
            ratings: Some(4.5),
            total_orders: Some(10),
            account_tier: Some(AccountTier::Premium),
            password: Some("replacement-password".into()),
            ..Default::default()
        };
        let user = service.update_user(1, request).await.unwrap();

        assert_eq!(user.points, 5.5);
        assert!(correct_password("replacement-password", &user.password));
        assert!(user.password_changed_at.is_some());
    }

    #[tokio::test]
    async fn update_user_missing_record_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().never();
        let service = UserService::new(repo, &test_config());

        let err = service.update_user(42, UpdateUserRequest::default()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email.to_string() == "test@example.com")
            .returning(|_| Ok(Some(stored_user("initial-password"))));
        let service = UserService::new(repo, &test_config());

        let ok = service
            .authenticate(LoginRequest {
                email: "test@example.com".into(),
                password: "initial-password".into(),
            })
            .await;
        let wrong = service
            .authenticate(LoginRequest {
                email: "test@example.com".into(),
                password: "wrong-password".into(),
            })
            .await;

        assert!(ok.is_ok());
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn authenticate_unknown_email_matches_wrong_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        let service = UserService::new(repo, &test_config());

        let err = service
            .authenticate(LoginRequest {
                email: "ghost@example.com".into(),
                password: "whatever".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn stale_token_detection_uses_change_time() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| {
            let mut user = stored_user("initial-password");
            user.password_changed_at = Some(Utc::now());
            Ok(Some(user))
        });
        let service = UserService::new(repo, &test_config());

        let issued_long_ago = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(service.is_token_stale(1, issued_long_ago).await.unwrap());

        let issued_later = (Utc::now() + Duration::hours(1)).timestamp();
        assert!(!service.is_token_stale(1, issued_later).await.unwrap());
    }

    #[tokio::test]
    async fn request_password_reset_persists_digest_only() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("initial-password"))));
        repo.expect_update()
            .withf(|user| {
                user.password_reset_token.is_some()
                    && user.password_reset_expires.is_some()
                    && user.password_changed_at.is_none()
            })
            .times(1)
            .returning(|user| Ok(user.clone()));
        let service = UserService::new(repo, &test_config());

        let token = service
            .request_password_reset(ForgotPasswordRequest {
                email: "test@example.com".into(),
                mode: ResetTokenMode::Opaque,
            })
            .await
            .unwrap();

        assert_eq!(token.len(), 64);
    }

    #[tokio::test]
    async fn reset_password_consumes_token() {
        let issuer = ResetTokenIssuer::default();
        let mut user = stored_user("initial-password");
        let token = issuer.create_password_reset_token(&mut user, ResetTokenMode::Opaque, Utc::now());
        let digest = hash_reset_token(&token);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_reset_token()
            .withf(move |hash| hash.to_string() == digest)
            .returning(move |_| Ok(Some(user.clone())));
        echo_update(&mut repo);
        let service = UserService::new(repo, &test_config());

        let updated = service
            .reset_password(ResetPasswordRequest {
                email: None,
                token: token.clone(),
                password: "after-reset-password".into(),
            })
            .await
            .unwrap();

        assert!(correct_password("after-reset-password", &updated.password));
        assert!(updated.password_reset_token.is_none());
        assert!(updated.password_reset_expires.is_none());
        assert!(updated.password_changed_at.is_some());
        assert!(verify_reset_token(&updated, &token, Utc::now()).is_err());
    }

    #[tokio::test]
    async fn reset_password_refuses_numeric_token_without_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_reset_token().never();
        repo.expect_find_by_email().never();
        repo.expect_update().never();
        let service = UserService::new(repo, &test_config());

        for guess in [1000, 6374, 9999] {
            let err = service
                .reset_password(ResetPasswordRequest {
                    email: None,
                    token: guess.to_string(),
                    password: "taken-over-password".into(),
                })
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::InvalidToken));
        }
    }

    #[tokio::test]
    async fn reset_password_rejects_expired_numeric_token() {
        let issuer = ResetTokenIssuer::default();
        let mut user = stored_user("initial-password");
        let token = issuer.create_password_reset_token(
            &mut user,
            ResetTokenMode::Numeric,
            Utc::now() - Duration::minutes(11),
        );

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update().never();
        let service = UserService::new(repo, &test_config());

        let err = service
            .reset_password(ResetPasswordRequest {
                email: Some("test@example.com".into()),
                token,
                password: "after-reset-password".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidToken));
    }
}
