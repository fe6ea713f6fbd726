//! In-memory mock implementations of the external collaborator traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::subscription::{Subscription, SubscriptionStatus},
    domain::entities::user::User,
    use_cases::auth::TokenBlacklist,
    use_cases::subscription::{ReminderScheduler, SubscriptionRepo},
    use_cases::user::UserRepo,
};

// ============================================================================
// Credential store
// ============================================================================

/// In-memory implementation of UserRepo for testing.
#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial users for testing.
    pub fn with_users(users: Vec<User>) -> Self {
        let map: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Mutex::new(map),
        }
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();

        // Mirrors the transactional uniqueness guarantee of the real store.
        if users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(email) = email {
            user.email = email.to_string();
        }
        if let Some(password_hash) = password_hash {
            user.password_hash = password_hash.to_string();
        }
        user.updated_at = Some(Utc::now());

        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

// ============================================================================
// Subscription store
// ============================================================================

/// In-memory implementation of SubscriptionRepo for testing.
#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial subscriptions for testing.
    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        let map: HashMap<Uuid, Subscription> =
            subscriptions.into_iter().map(|s| (s.id, s)).collect();
        Self {
            subscriptions: Mutex::new(map),
        }
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let now = Utc::now();
        let mut stored = subscription.clone();
        stored.created_at = Some(now);
        stored.updated_at = Some(now);

        self.subscriptions
            .lock()
            .unwrap()
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.subscriptions.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let existing = subscriptions
            .get_mut(&subscription.id)
            .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?;

        let mut stored = subscription.clone();
        // The update statement does not touch these columns.
        stored.cancellation_date = existing.cancellation_date;
        stored.created_at = existing.created_at;
        stored.updated_at = Some(Utc::now());
        *existing = stored.clone();

        Ok(stored)
    }

    async fn cancel(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let existing = subscriptions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?;

        existing.status = SubscriptionStatus::Cancelled;
        existing.cancellation_date = Some(at);
        existing.updated_at = Some(Utc::now());

        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.subscriptions
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Subscription not found".into()))
    }

    async fn list_all(&self) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_renewing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        owner: Option<Uuid>,
    ) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.renewal_date >= from && s.renewal_date <= to)
            .filter(|s| owner.is_none_or(|user_id| s.user_id == user_id))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Revocation registry
// ============================================================================

/// In-memory revocation registry. TTL behavior is not simulated; entries
/// simply persist for the test's lifetime.
#[derive(Default)]
pub struct InMemoryTokenBlacklist {
    revoked: Mutex<HashSet<String>>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.revoked.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.revoked.lock().unwrap().insert(token.to_string());
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        Ok(self.revoked.lock().unwrap().contains(token))
    }
}

// ============================================================================
// Reminder scheduler
// ============================================================================

/// Records every trigger for test assertions.
#[derive(Default)]
pub struct RecordingScheduler {
    triggers: Mutex<Vec<Uuid>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggered(&self) -> Vec<Uuid> {
        self.triggers.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderScheduler for RecordingScheduler {
    async fn trigger(&self, subscription_id: Uuid) -> AppResult<()> {
        self.triggers.lock().unwrap().push(subscription_id);
        Ok(())
    }
}

/// Always fails, for exercising the fire-and-forget contract.
pub struct FailingScheduler;

#[async_trait]
impl ReminderScheduler for FailingScheduler {
    async fn trigger(&self, _subscription_id: Uuid) -> AppResult<()> {
        Err(AppError::Unavailable)
    }
}

// ============================================================================
// Rate limiter
// ============================================================================

/// Rate limiter that never rejects.
#[derive(Default)]
pub struct InMemoryRateLimiter;

impl InMemoryRateLimiter {
    pub fn permissive() -> Self {
        Self
    }
}

#[async_trait]
impl crate::infra::rate_limit::RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, _ip: &str) -> AppResult<()> {
        Ok(())
    }
}
