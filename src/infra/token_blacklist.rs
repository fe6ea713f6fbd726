use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    app_error::{AppError, AppResult},
    infra::InfraError,
    use_cases::auth::TokenBlacklist,
};

/// Redis-backed revocation registry for signed-out tokens.
///
/// Every entry carries a TTL (the revocation window), so the registry
/// self-prunes: once the underlying token would have expired anyway, its
/// blacklist entry disappears. The window must be configured at least as
/// long as the token TTL so a revoked token can never outlive its entry.
///
/// Fail policy is fail-closed: an unreachable Redis surfaces as
/// `Unavailable`, rejecting the request rather than silently resurrecting
/// signed-out sessions.
#[derive(Clone)]
pub struct RedisTokenBlacklist {
    manager: ConnectionManager,
    window_secs: u64,
}

impl RedisTokenBlacklist {
    pub async fn new(redis_url: &str, window_secs: u64) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;

        Ok(Self {
            manager,
            window_secs,
        })
    }

    fn key(token: &str) -> String {
        format!("blacklist:{token}")
    }
}

#[async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn revoke(&self, token: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let key = Self::key(token);

        // SET EX overwrites an existing entry, so revoking twice is a no-op.
        let _: () = conn
            .set_ex(key, "1", self.window_secs)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Revocation registry unreachable");
                AppError::Unavailable
            })?;

        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        let key = Self::key(token);

        let revoked: bool = conn.exists(key).await.map_err(|err| {
            tracing::error!(error = %err, "Revocation registry unreachable");
            AppError::Unavailable
        })?;

        Ok(revoked)
    }
}
