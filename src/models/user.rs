use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::dto::UserResponse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountTier {
    Premium,
    #[default]
    Normal,
}

/// User model (database entity)
///
/// `password` holds a bcrypt hash once the record has been through the
/// update pipeline, and `password_reset_token` holds the SHA-256 digest of
/// the token handed to the user, never the token itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Assigned by the database on insert; 0 until then.
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub nic: Option<String>,
    pub email: String,
    pub gender: Gender,
    pub img_link: Option<String>,
    pub role: Role,
    /// NULL tiers are tolerated and weigh nothing in the points formula.
    pub account_tier: Option<AccountTier>,
    pub points: f64,
    pub ratings: f64,
    pub total_orders: i32,
    #[serde(skip_serializing)]
    pub password: String,
    pub password_changed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a not-yet-persisted user with schema defaults applied
    pub fn new(
        first_name: String,
        last_name: String,
        phone: String,
        email: String,
        password: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: 0,
            first_name,
            last_name,
            phone,
            dob: None,
            nic: None,
            email,
            gender: Gender::default(),
            img_link: None,
            role: Role::default(),
            account_tier: Some(AccountTier::default()),
            points: 0.0,
            ratings: 0.0,
            total_orders: 0,
            password,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.user_id > 0
    }

    /// Convert to response (without credential fields)
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            dob: self.dob,
            nic: self.nic.clone(),
            email: self.email.clone(),
            gender: self.gender,
            img_link: self.img_link.clone(),
            role: self.role,
            account_tier: self.account_tier,
            points: self.points,
            ratings: self.ratings,
            total_orders: self.total_orders,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            "Ada".into(),
            "Lovelace".into(),
            "0771234567".into(),
            "ada@example.com".into(),
            "$2b$04$placeholderplaceholderplaceholderplaceholderpla".into(),
        )
    }

    #[test]
    fn new_user_carries_schema_defaults() {
        let user = sample();
        assert_eq!(user.user_id, 0);
        assert!(!user.is_persisted());
        assert_eq!(user.gender, Gender::None);
        assert_eq!(user.role, Role::User);
        assert_eq!(user.account_tier, Some(AccountTier::Normal));
        assert_eq!(user.points, 0.0);
        assert_eq!(user.ratings, 0.0);
        assert_eq!(user.total_orders, 0);
        assert!(user.password_changed_at.is_none());
        assert!(user.password_reset_token.is_none());
        assert!(user.password_reset_expires.is_none());
    }

    #[test]
    fn response_carries_profile_and_score_without_credentials() {
        let mut user = sample();
        user.user_id = 3;
        user.account_tier = Some(AccountTier::Premium);
        user.points = 5.5;
        user.ratings = 4.5;
        user.total_orders = 10;
        user.password_reset_token = Some("digest".into());

        let response = user.to_response();

        assert_eq!(response.user_id, 3);
        assert_eq!(response.email, "ada@example.com");
        assert_eq!(response.account_tier, Some(AccountTier::Premium));
        assert_eq!(response.points, 5.5);
        assert_eq!(response.ratings, 4.5);
        assert_eq!(response.total_orders, 10);

        let json = serde_json::to_value(&response).unwrap();
        for hidden in ["password", "password_changed_at", "password_reset_token", "password_reset_expires"] {
            assert!(json.get(hidden).is_none(), "{} leaked", hidden);
        }
    }

    #[test]
    fn serialized_user_hides_credentials() {
        let mut user = sample();
        user.password_reset_token = Some("digest".into());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_reset_token").is_none());
        assert!(json.get("password_reset_expires").is_none());
        assert_eq!(json["gender"], "none");
        assert_eq!(json["account_tier"], "normal");
    }
}
