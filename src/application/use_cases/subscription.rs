use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::validators,
    domain::entities::subscription::{
        Category, Currency, Frequency, Subscription, SubscriptionStatus,
    },
    use_cases::auth::Requester,
};

/// Renewals inside this window count as "upcoming".
const UPCOMING_RENEWAL_WINDOW_DAYS: i64 = 7;

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>>;
    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription>;
    async fn cancel(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Subscription>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    async fn list_all(&self) -> AppResult<Vec<Subscription>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>>;
    /// Subscriptions whose renewal date falls inside `[from, to]`, optionally
    /// restricted to one owner.
    async fn list_renewing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        owner: Option<Uuid>,
    ) -> AppResult<Vec<Subscription>>;
}

/// Kicks off the external reminder workflow for a subscription. Delivery and
/// retry semantics belong to that system, not to this crate.
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    async fn trigger(&self, subscription_id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionInput {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: String,
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub renewal_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    pub frequency: Option<Frequency>,
    pub category: Option<Category>,
    pub payment_method: Option<String>,
    pub status: Option<SubscriptionStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub renewal_date: Option<DateTime<Utc>>,
}

/// The single ownership predicate every by-id operation routes through.
pub fn can_access(requester: &Requester, owner_id: Uuid) -> bool {
    requester.id == owner_id || requester.is_admin
}

/// Builds a persistable subscription from creation input.
///
/// Derives the renewal date from the billing frequency when none is supplied
/// and forces `expired` status when the renewal date is already behind `now`.
/// This is the one normalization path shared by create and update; it never
/// lives in a storage hook.
pub fn resolve_new(
    owner_id: Uuid,
    input: CreateSubscriptionInput,
    now: DateTime<Utc>,
) -> AppResult<Subscription> {
    let name = input.name.trim().to_string();
    let payment_method = input.payment_method.trim().to_string();

    let renewal_date = input
        .renewal_date
        .unwrap_or_else(|| input.start_date + Duration::days(input.frequency.period_days()));

    let mut violations = Vec::new();
    if !validators::is_valid_name(&name) {
        violations.push("Subscription name must be between 2 and 100 characters");
    }
    if !(input.price >= 0.0) {
        violations.push("Price must be greater than or equal to 0");
    }
    if payment_method.is_empty() {
        violations.push("Payment method is required");
    }
    if input.start_date > now {
        violations.push("Start date must be in the past");
    }
    if renewal_date <= input.start_date {
        violations.push("Renewal date must be after the start date");
    }
    if !violations.is_empty() {
        return Err(AppError::Validation(violations.join(", ")));
    }

    let status = if renewal_date < now {
        SubscriptionStatus::Expired
    } else {
        input.status.unwrap_or_default()
    };

    Ok(Subscription {
        id: Uuid::new_v4(),
        name,
        price: input.price,
        currency: input.currency.unwrap_or_default(),
        frequency: input.frequency,
        category: input.category,
        payment_method,
        status,
        start_date: input.start_date,
        renewal_date,
        cancellation_date: None,
        user_id: owner_id,
        created_at: None,
        updated_at: None,
    })
}

/// Applies a field-wise patch and re-checks every creation invariant on the
/// merged record, including the forced-expiry rule.
pub fn apply_patch(
    existing: &Subscription,
    patch: SubscriptionPatch,
    now: DateTime<Utc>,
) -> AppResult<Subscription> {
    let mut updated = existing.clone();

    if let Some(name) = patch.name {
        updated.name = name.trim().to_string();
    }
    if let Some(price) = patch.price {
        updated.price = price;
    }
    if let Some(currency) = patch.currency {
        updated.currency = currency;
    }
    if let Some(frequency) = patch.frequency {
        updated.frequency = frequency;
    }
    if let Some(category) = patch.category {
        updated.category = category;
    }
    if let Some(payment_method) = patch.payment_method {
        updated.payment_method = payment_method.trim().to_string();
    }
    if let Some(status) = patch.status {
        updated.status = status;
    }
    if let Some(start_date) = patch.start_date {
        updated.start_date = start_date;
    }
    if let Some(renewal_date) = patch.renewal_date {
        updated.renewal_date = renewal_date;
    }

    let mut violations = Vec::new();
    if !validators::is_valid_name(&updated.name) {
        violations.push("Subscription name must be between 2 and 100 characters");
    }
    if !(updated.price >= 0.0) {
        violations.push("Price must be greater than or equal to 0");
    }
    if updated.payment_method.is_empty() {
        violations.push("Payment method is required");
    }
    if updated.start_date > now {
        violations.push("Start date must be in the past");
    }
    if updated.renewal_date <= updated.start_date {
        violations.push("Renewal date must be after the start date");
    }
    if !violations.is_empty() {
        return Err(AppError::Validation(violations.join(", ")));
    }

    if updated.renewal_date < now {
        updated.status = SubscriptionStatus::Expired;
    }

    Ok(updated)
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
    scheduler: Arc<dyn ReminderScheduler>,
}

impl SubscriptionUseCases {
    pub fn new(repo: Arc<dyn SubscriptionRepo>, scheduler: Arc<dyn ReminderScheduler>) -> Self {
        Self { repo, scheduler }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: CreateSubscriptionInput,
    ) -> AppResult<Subscription> {
        let candidate = resolve_new(owner_id, input, Utc::now())?;
        let created = self.repo.insert(&candidate).await?;

        // Best-effort: the reminder workflow is not transactional with the
        // insert, so a trigger failure must not undo the subscription.
        if let Err(err) = self.scheduler.trigger(created.id).await {
            tracing::warn!(
                subscription_id = %created.id,
                error = %err,
                "Reminder trigger failed; subscription was still created"
            );
        }

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid, requester: &Requester) -> AppResult<Subscription> {
        let subscription = self.load(id).await?;
        ensure_access(requester, subscription.user_id, "view")?;
        Ok(subscription)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: Uuid,
        requester: &Requester,
        patch: SubscriptionPatch,
    ) -> AppResult<Subscription> {
        let existing = self.load(id).await?;
        ensure_access(requester, existing.user_id, "update")?;

        let updated = apply_patch(&existing, patch, Utc::now())?;
        self.repo.update(&updated).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid, requester: &Requester) -> AppResult<Subscription> {
        let existing = self.load(id).await?;
        ensure_access(requester, existing.user_id, "cancel")?;

        self.repo.cancel(id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid, requester: &Requester) -> AppResult<()> {
        let existing = self.load(id).await?;
        ensure_access(requester, existing.user_id, "delete")?;

        self.repo.delete(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> AppResult<Vec<Subscription>> {
        self.repo.list_all().await
    }

    #[instrument(skip(self))]
    pub async fn list_upcoming_renewals(
        &self,
        requester: &Requester,
    ) -> AppResult<Vec<Subscription>> {
        let now = Utc::now();
        let until = now + Duration::days(UPCOMING_RENEWAL_WINDOW_DAYS);
        let owner = if requester.is_admin {
            None
        } else {
            Some(requester.id)
        };
        self.repo.list_renewing_between(now, until, owner).await
    }

    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        target_user_id: Uuid,
        requester: &Requester,
    ) -> AppResult<Vec<Subscription>> {
        if !can_access(requester, target_user_id) {
            return Err(AppError::Forbidden(
                "Unauthorized access. You can only view your own subscriptions.".into(),
            ));
        }
        self.repo.list_by_user(target_user_id).await
    }

    async fn load(&self, id: Uuid) -> AppResult<Subscription> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".into()))
    }
}

fn ensure_access(requester: &Requester, owner_id: Uuid, action: &str) -> AppResult<()> {
    if can_access(requester, owner_id) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "You are not authorized to {action} this subscription"
    )))
}
