use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::subscription::Subscription,
    use_cases::subscription::SubscriptionRepo,
};

const SELECT_COLS: &str = "id, name, price, currency, frequency, category, payment_method, \
     status, start_date, renewal_date, cancellation_date, user_id, created_at, updated_at";

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn insert(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let rec = sqlx::query_as::<_, Subscription>(&format!(
            "INSERT INTO subscriptions \
                (id, name, price, currency, frequency, category, payment_method, \
                 status, start_date, renewal_date, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {SELECT_COLS}"
        ))
        .bind(subscription.id)
        .bind(&subscription.name)
        .bind(subscription.price)
        .bind(subscription.currency)
        .bind(subscription.frequency)
        .bind(subscription.category)
        .bind(&subscription.payment_method)
        .bind(subscription.status)
        .bind(subscription.start_date)
        .bind(subscription.renewal_date)
        .bind(subscription.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let rec = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SELECT_COLS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let rec = sqlx::query_as::<_, Subscription>(&format!(
            "UPDATE subscriptions SET \
                name = $2, price = $3, currency = $4, frequency = $5, category = $6, \
                payment_method = $7, status = $8, start_date = $9, renewal_date = $10, \
                updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 RETURNING {SELECT_COLS}"
        ))
        .bind(subscription.id)
        .bind(&subscription.name)
        .bind(subscription.price)
        .bind(subscription.currency)
        .bind(subscription.frequency)
        .bind(subscription.category)
        .bind(&subscription.payment_method)
        .bind(subscription.status)
        .bind(subscription.start_date)
        .bind(subscription.renewal_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?;
        Ok(rec)
    }

    async fn cancel(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Subscription> {
        let rec = sqlx::query_as::<_, Subscription>(&format!(
            "UPDATE subscriptions SET \
                status = 'cancelled', cancellation_date = $2, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 RETURNING {SELECT_COLS}"
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?;
        Ok(rec)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Subscription not found".into()));
        }
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Subscription>> {
        let recs = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SELECT_COLS} FROM subscriptions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(recs)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let recs = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SELECT_COLS} FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(recs)
    }

    async fn list_renewing_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        owner: Option<Uuid>,
    ) -> AppResult<Vec<Subscription>> {
        let recs = match owner {
            Some(user_id) => {
                sqlx::query_as::<_, Subscription>(&format!(
                    "SELECT {SELECT_COLS} FROM subscriptions \
                     WHERE renewal_date >= $1 AND renewal_date <= $2 AND user_id = $3 \
                     ORDER BY renewal_date"
                ))
                .bind(from)
                .bind(to)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Subscription>(&format!(
                    "SELECT {SELECT_COLS} FROM subscriptions \
                     WHERE renewal_date >= $1 AND renewal_date <= $2 \
                     ORDER BY renewal_date"
                ))
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(AppError::from)?;
        Ok(recs)
    }
}
