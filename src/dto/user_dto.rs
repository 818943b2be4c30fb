use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{AccountTier, ChangeSet, Gender, Role, User, UserField};
use crate::services::ResetTokenMode;

/// User response (without credential fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
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
    pub account_tier: Option<AccountTier>,
    pub points: f64,
    pub ratings: f64,
    pub total_orders: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create user request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name: String,

    #[validate(length(min = 4, max = 20, message = "Phone must be between 4 and 20 characters"))]
    pub phone: String,

    pub dob: Option<NaiveDate>,

    #[validate(length(min = 1, max = 20, message = "NIC must be between 1 and 20 characters"))]
    pub nic: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub gender: Option<Gender>,

    pub img_link: Option<String>,

    pub role: Option<Role>,

    pub account_tier: Option<AccountTier>,

    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub password: String,
}

impl CreateUserRequest {
    /// Build an unsaved record; the password is still plaintext at this point.
    pub fn into_user(self) -> User {
        let mut user = User::new(
            self.first_name,
            self.last_name,
            self.phone,
            self.email,
            self.password,
        );
        user.dob = self.dob;
        user.nic = self.nic;
        user.img_link = self.img_link;
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(tier) = self.account_tier {
            user.account_tier = Some(tier);
        }
        user
    }
}

/// Update user request. `points` is derived and deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(min = 4, max = 20, message = "Phone must be between 4 and 20 characters"))]
    pub phone: Option<String>,

    pub dob: Option<NaiveDate>,

    #[validate(length(min = 1, max = 20, message = "NIC must be between 1 and 20 characters"))]
    pub nic: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub gender: Option<Gender>,

    pub img_link: Option<String>,

    pub role: Option<Role>,

    pub account_tier: Option<AccountTier>,

    #[validate(range(min = 0.0, message = "Ratings cannot be negative"))]
    pub ratings: Option<f64>,

    #[validate(range(min = 0, message = "Total orders cannot be negative"))]
    pub total_orders: Option<i32>,

    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub password: Option<String>,
}

fn assign<T: PartialEq>(slot: &mut T, value: T, field: UserField, changes: &mut ChangeSet) {
    if *slot != value {
        *slot = value;
        changes.mark(field);
    }
}

impl UpdateUserRequest {
    /// Write the requested values into `user` and report which fields actually changed.
    pub fn apply_to(&self, user: &mut User) -> ChangeSet {
        let mut changes = ChangeSet::for_update();

        if let Some(first_name) = &self.first_name {
            assign(&mut user.first_name, first_name.clone(), UserField::FirstName, &mut changes);
        }
        if let Some(last_name) = &self.last_name {
            assign(&mut user.last_name, last_name.clone(), UserField::LastName, &mut changes);
        }
        if let Some(phone) = &self.phone {
            assign(&mut user.phone, phone.clone(), UserField::Phone, &mut changes);
        }
        if let Some(dob) = self.dob {
            assign(&mut user.dob, Some(dob), UserField::Dob, &mut changes);
        }
        if let Some(nic) = &self.nic {
            assign(&mut user.nic, Some(nic.clone()), UserField::Nic, &mut changes);
        }
        if let Some(email) = &self.email {
            assign(&mut user.email, email.clone(), UserField::Email, &mut changes);
        }
        if let Some(gender) = self.gender {
            assign(&mut user.gender, gender, UserField::Gender, &mut changes);
        }
        if let Some(img_link) = &self.img_link {
            assign(&mut user.img_link, Some(img_link.clone()), UserField::ImgLink, &mut changes);
        }
        if let Some(role) = self.role {
            assign(&mut user.role, role, UserField::Role, &mut changes);
        }
        if let Some(tier) = self.account_tier {
            assign(&mut user.account_tier, Some(tier), UserField::AccountTier, &mut changes);
        }
        if let Some(ratings) = self.ratings {
            assign(&mut user.ratings, ratings, UserField::Ratings, &mut changes);
        }
        if let Some(total_orders) = self.total_orders {
            assign(&mut user.total_orders, total_orders, UserField::TotalOrders, &mut changes);
        }
        // The stored value is a hash, so any supplied password counts as a change.
        if let Some(password) = &self.password {
            user.password = password.clone();
            changes.mark(UserField::Password);
        }

        changes
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Forgot password request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    pub mode: ResetTokenMode,
}

/// Reset password request
///
/// Numeric tokens are only four digits and can collide across accounts, so
/// they are redeemed together with the account email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub password: String,
}
