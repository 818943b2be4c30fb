use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppResult;
use crate::models::User;

/// Persistence seam for users. Implementations enforce the uniqueness and
/// not-null constraints and surface them as `AppError::ConstraintViolation`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> AppResult<User>;
    async fn update(&self, user: &User) -> AppResult<User>;
    async fn find_by_id(&self, user_id: i32) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>>;
}

/// Postgres-backed repository
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> AppResult<User> {
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, phone, dob, nic, email, gender, img_link,
                                role, account_tier, points, ratings, total_orders, password,
                                password_changed_at, password_reset_token, password_reset_expires,
                                created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING *",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.dob)
        .bind(&user.nic)
        .bind(&user.email)
        .bind(user.gender)
        .bind(&user.img_link)
        .bind(user.role)
        .bind(user.account_tier)
        .bind(user.points)
        .bind(user.ratings)
        .bind(user.total_orders)
        .bind(&user.password)
        .bind(user.password_changed_at)
        .bind(&user.password_reset_token)
        .bind(user.password_reset_expires)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET first_name = $1, last_name = $2, phone = $3, dob = $4, nic = $5,
                              email = $6, gender = $7, img_link = $8, role = $9, account_tier = $10,
                              points = $11, ratings = $12, total_orders = $13, password = $14,
                              password_changed_at = $15, password_reset_token = $16,
                              password_reset_expires = $17, updated_at = $18
             WHERE user_id = $19
             RETURNING *",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.dob)
        .bind(&user.nic)
        .bind(&user.email)
        .bind(user.gender)
        .bind(&user.img_link)
        .bind(user.role)
        .bind(user.account_tier)
        .bind(user.points)
        .bind(user.ratings)
        .bind(user.total_orders)
        .bind(&user.password)
        .bind(user.password_changed_at)
        .bind(&user.password_reset_token)
        .bind(user.password_reset_expires)
        .bind(user.updated_at)
        .bind(user.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn find_by_id(&self, user_id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE password_reset_token = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
