//! Test app state builder for HTTP-level integration testing.
//!
//! Creates a minimal `AppState` with in-memory mocks so routers can be
//! exercised through `axum_test::TestServer` without Postgres or Redis.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::subscription::Subscription,
    domain::entities::user::User,
    infra::{config::AppConfig, crypto::PasswordHasher, rate_limit::RateLimiterTrait},
    test_utils::{
        ADMIN_EMAIL, InMemoryRateLimiter, InMemorySubscriptionRepo, InMemoryTokenBlacklist,
        InMemoryUserRepo, RecordingScheduler, TEST_JWT_SECRET,
    },
    use_cases::{
        auth::AuthUseCases, subscription::SubscriptionUseCases, user::UserUseCases,
    },
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user = create_test_user(|u| u.email = "jane@example.com".into());
/// let app_state = TestAppStateBuilder::new().with_user(user).build();
/// let server = TestServer::new(routes::router(app_state)).unwrap();
/// ```
pub struct TestAppStateBuilder {
    users: Vec<User>,
    subscriptions: Vec<Subscription>,
    admin_email: String,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            users: vec![],
            subscriptions: vec![],
            admin_email: ADMIN_EMAIL.to_string(),
        }
    }

    /// Add a user to the test state.
    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    /// Add a subscription to the test state.
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Override the configured admin address.
    pub fn with_admin_email(mut self, admin_email: &str) -> Self {
        self.admin_email = admin_email.to_string();
        self
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        self.build_with_mocks().0
    }

    /// Build the AppState, returning the blacklist and scheduler mocks for
    /// test assertions.
    pub fn build_with_mocks(
        self,
    ) -> (
        AppState,
        Arc<InMemoryTokenBlacklist>,
        Arc<RecordingScheduler>,
    ) {
        let user_repo = Arc::new(InMemoryUserRepo::with_users(self.users));
        let subscription_repo = Arc::new(InMemorySubscriptionRepo::with_subscriptions(
            self.subscriptions,
        ));
        let blacklist = Arc::new(InMemoryTokenBlacklist::new());
        let scheduler = Arc::new(RecordingScheduler::new());
        let hasher = PasswordHasher::new();

        let config = Arc::new(AppConfig {
            jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
            token_ttl: time::Duration::hours(24),
            revocation_window_secs: 604_800,
            admin_email: self.admin_email.clone(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            redis_url: String::new(),
            server_url: Url::parse("http://localhost:3001").unwrap(),
            qstash_url: Url::parse("http://localhost:8080").unwrap(),
            qstash_token: SecretString::new("test_qstash_token".into()),
            rate_limit_window_secs: 60,
            rate_limit_per_ip: 60,
            trust_proxy: false,
        });

        let auth_use_cases = Arc::new(AuthUseCases::new(
            user_repo.clone(),
            blacklist.clone(),
            hasher.clone(),
            config.jwt_secret.clone(),
            config.token_ttl,
            self.admin_email,
        ));

        let user_use_cases = Arc::new(UserUseCases::new(user_repo, hasher));

        let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
            subscription_repo,
            scheduler.clone(),
        ));

        let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(InMemoryRateLimiter::permissive());

        let app_state = AppState {
            config,
            auth_use_cases,
            user_use_cases,
            subscription_use_cases,
            rate_limiter,
        };

        (app_state, blacklist, scheduler)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
