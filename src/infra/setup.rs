use crate::{
    adapters::{http::app_state::AppState, scheduler::workflow::UpstashSchedulerClient},
    infra::{
        config::AppConfig, crypto::PasswordHasher, postgres_persistence,
        rate_limit::RedisRateLimiter, token_blacklist::RedisTokenBlacklist,
    },
    use_cases::{
        auth::{AuthUseCases, TokenBlacklist},
        subscription::{ReminderScheduler, SubscriptionRepo, SubscriptionUseCases},
        user::{UserRepo, UserUseCases},
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let blacklist = Arc::new(
        RedisTokenBlacklist::new(&config.redis_url, config.revocation_window_secs).await?,
    ) as Arc<dyn TokenBlacklist>;

    let rate_limiter = Arc::new(
        RedisRateLimiter::new(
            &config.redis_url,
            config.rate_limit_window_secs,
            config.rate_limit_per_ip,
        )
        .await?,
    );

    let scheduler = Arc::new(UpstashSchedulerClient::new(
        config.qstash_url.clone(),
        &config.server_url,
        config.qstash_token.clone(),
    )) as Arc<dyn ReminderScheduler>;

    let user_repo_arc = postgres_arc.clone() as Arc<dyn UserRepo>;
    let subscription_repo_arc = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;
    let hasher = PasswordHasher::new();

    let auth_use_cases = AuthUseCases::new(
        user_repo_arc.clone(),
        blacklist,
        hasher.clone(),
        config.jwt_secret.clone(),
        config.token_ttl,
        config.admin_email.clone(),
    );

    let user_use_cases = UserUseCases::new(user_repo_arc, hasher);

    let subscription_use_cases = SubscriptionUseCases::new(subscription_repo_arc, scheduler);

    Ok(AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(auth_use_cases),
        user_use_cases: Arc::new(user_use_cases),
        subscription_use_cases: Arc::new(subscription_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subtrackr=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
