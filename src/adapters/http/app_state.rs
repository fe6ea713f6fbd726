use std::sync::Arc;

use crate::{
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    use_cases::{auth::AuthUseCases, subscription::SubscriptionUseCases, user::UserUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub user_use_cases: Arc<UserUseCases>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
