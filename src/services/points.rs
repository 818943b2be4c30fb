use crate::models::{AccountTier, User};

/// Weight an account tier contributes to the loyalty score.
/// A missing tier contributes nothing.
pub fn tier_weight(tier: Option<AccountTier>) -> f64 {
    match tier {
        Some(AccountTier::Normal) => 1.0,
        Some(AccountTier::Premium) => 2.0,
        None => 0.0,
    }
}

/// Loyalty score derived from ratings, order count and tier.
///
/// `(ratings + total_orders + tier_weight) / 3`, rounded to two decimals with
/// ties going away from zero (`f64::round`).
pub fn recompute_points(user: &User) -> f64 {
    let raw = (user.ratings + f64::from(user.total_orders) + tier_weight(user.account_tier)) / 3.0;
    (raw * 100.0).round() / 100.0
}

/// Overwrite `points` unconditionally.
pub fn apply_points(user: &mut User) {
    user.points = recompute_points(user);
}
