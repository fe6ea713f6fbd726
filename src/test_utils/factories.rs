//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible
//! defaults. Use the closure parameter to override specific fields as needed.

use chrono::{Duration, Utc};
use secrecy::SecretString;
use uuid::Uuid;

use crate::{
    application::jwt,
    domain::entities::subscription::{
        Category, Currency, Frequency, Subscription, SubscriptionStatus,
    },
    domain::entities::user::User,
    infra::crypto::PasswordHasher,
};

/// The admin address every test app state is configured with.
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// The JWT secret every test app state is configured with.
pub const TEST_JWT_SECRET: &str = "test_jwt_secret";

/// The password behind every factory user's stored hash.
pub const TEST_PASSWORD: &str = "password123";

/// Issue a token that the test app state will accept for this user.
pub fn test_token(user_id: Uuid) -> String {
    jwt::issue(
        user_id,
        &SecretString::new(TEST_JWT_SECRET.into()),
        time::Duration::hours(1),
    )
    .unwrap()
}

/// Issue a token that is already past its expiry.
pub fn expired_test_token(user_id: Uuid) -> String {
    jwt::issue(
        user_id,
        &SecretString::new(TEST_JWT_SECRET.into()),
        time::Duration::hours(-1),
    )
    .unwrap()
}

/// Create a test user with sensible defaults. The stored hash matches
/// [`TEST_PASSWORD`].
pub fn create_test_user(overrides: impl FnOnce(&mut User)) -> User {
    let now = Utc::now();
    let mut user = User {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: "user@example.com".to_string(),
        password_hash: PasswordHasher::new().hash(TEST_PASSWORD).unwrap(),
        created_at: Some(now),
        updated_at: Some(now),
    };
    overrides(&mut user);
    user
}

/// Create a test subscription with sensible defaults: started a month ago,
/// renewing a month from now, active.
pub fn create_test_subscription(
    user_id: Uuid,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let now = Utc::now();
    let mut subscription = Subscription {
        id: Uuid::new_v4(),
        name: "Netflix".to_string(),
        price: 15.99,
        currency: Currency::Usd,
        frequency: Frequency::Monthly,
        category: Category::Entertainment,
        payment_method: "Credit Card".to_string(),
        status: SubscriptionStatus::Active,
        start_date: now - Duration::days(30),
        renewal_date: now + Duration::days(30),
        cancellation_date: None,
        user_id,
        created_at: Some(now),
        updated_at: Some(now),
    };
    overrides(&mut subscription);
    subscription
}
