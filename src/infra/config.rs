use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub jwt_secret: SecretString,
    /// Lifetime of issued session tokens.
    pub token_ttl: Duration,
    /// TTL for blacklist entries. Must be at least as long as `token_ttl`
    /// so a revoked token cannot outlive its entry.
    pub revocation_window_secs: u64,
    /// The one configured admin address; admin-ness is email equality.
    pub admin_email: String,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,
    /// Public base URL of this API, used to build workflow callback URLs.
    pub server_url: Url,
    /// Upstash workflow endpoint that schedules reminder runs.
    pub qstash_url: Url,
    pub qstash_token: SecretString,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy (Caddy, nginx).
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let token_ttl_secs: i64 = get_env_default("JWT_TTL_SECS", 86_400);
        let revocation_window_secs: u64 =
            get_env_default("TOKEN_REVOCATION_WINDOW_SECS", 604_800);

        let admin_email: String = get_env("ADMIN_EMAIL");

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());

        let server_url: Url = get_env("SERVER_URL");
        let qstash_url: Url = get_env("QSTASH_URL");
        let qstash_token: SecretString =
            SecretString::new(get_env::<String>("QSTASH_TOKEN").into());

        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 60);
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        Self {
            jwt_secret,
            token_ttl: Duration::seconds(token_ttl_secs),
            revocation_window_secs,
            admin_email,
            cors_origin,
            bind_addr,
            database_url,
            redis_url,
            server_url,
            qstash_url,
            qstash_token,
            rate_limit_window_secs,
            rate_limit_per_ip,
            trust_proxy,
        }
    }
}
