use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{jwt, validators},
    infra::crypto::PasswordHasher,
    use_cases::user::{UserProfile, UserRepo},
};

/// Tokens that were explicitly invalidated before their natural expiry.
/// Entries self-expire after a fixed revocation window, so the store never
/// needs unbounded growth.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Idempotent: revoking an already-revoked token is a no-op.
    async fn revoke(&self, token: &str) -> AppResult<()>;
    /// Absence means "not revoked", not "valid" - signature and expiry are
    /// still the verifier's job.
    async fn is_revoked(&self, token: &str) -> AppResult<bool>;
}

/// The identity resolved for an authorized request.
#[derive(Debug, Clone)]
pub struct Requester {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct AuthUseCases {
    users: Arc<dyn UserRepo>,
    blacklist: Arc<dyn TokenBlacklist>,
    hasher: PasswordHasher,
    jwt_secret: SecretString,
    token_ttl: Duration,
    admin_email: String,
}

impl AuthUseCases {
    pub fn new(
        users: Arc<dyn UserRepo>,
        blacklist: Arc<dyn TokenBlacklist>,
        hasher: PasswordHasher,
        jwt_secret: SecretString,
        token_ttl: Duration,
        admin_email: String,
    ) -> Self {
        Self {
            users,
            blacklist,
            hasher,
            jwt_secret,
            token_ttl,
            admin_email,
        }
    }

    /// Admin-ness is email equality against the configured admin address;
    /// there is no stored role.
    pub fn is_admin(&self, email: &str) -> bool {
        email == self.admin_email
    }

    #[instrument(skip_all, fields(email = %email))]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(String, UserProfile)> {
        let name = name.trim();
        let email = email.trim();

        let mut violations = Vec::new();
        if !validators::is_valid_name(name) {
            violations.push("Name must be between 2 and 100 characters");
        }
        if !validators::is_valid_email(email) {
            violations.push("Email must be a valid email address");
        }
        if !validators::is_valid_password(password) {
            violations.push("Password must be at least 6 characters");
        }
        if !violations.is_empty() {
            return Err(AppError::Validation(violations.join(", ")));
        }

        let password_hash = self.hasher.hash(password)?;
        // The repo runs the existence check and insert in one transaction;
        // a lost race still surfaces here as Conflict.
        let user = self.users.create(name, email, &password_hash).await?;

        let token = jwt::issue(user.id, &self.jwt_secret, self.token_ttl)?;
        Ok((token, user.into()))
    }

    #[instrument(skip_all, fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<(String, UserProfile)> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid password".into()));
        }

        let token = jwt::issue(user.id, &self.jwt_secret, self.token_ttl)?;
        Ok((token, user.into()))
    }

    /// Blacklists the presented token. The token is decoded without
    /// verification so that signing out with an already-expired token still
    /// succeeds; revocation keys on the raw token string.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, token: &str) -> AppResult<()> {
        if let Ok(claims) = jwt::decode_unverified(token) {
            tracing::debug!(user_id = %claims.sub, "User signed out");
        }
        self.blacklist.revoke(token).await
    }

    /// The Authorization Guard's composition: signature/expiry check, then
    /// revocation lookup, then user resolution. Every failure collapses to
    /// the same Unauthorized response.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, token: &str) -> AppResult<Requester> {
        let claims = jwt::verify(token, &self.jwt_secret)?;

        if self.blacklist.is_revoked(token).await? {
            return Err(AppError::unauthorized());
        }

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AppError::unauthorized())?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(AppError::unauthorized)?;

        let is_admin = self.is_admin(&user.email);
        Ok(Requester {
            id: user.id,
            email: user.email,
            is_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{InMemoryTokenBlacklist, InMemoryUserRepo, create_test_user};

    const ADMIN_EMAIL: &str = "admin@example.com";

    fn use_cases(users: Vec<crate::domain::entities::user::User>) -> AuthUseCases {
        AuthUseCases::new(
            Arc::new(InMemoryUserRepo::with_users(users)),
            Arc::new(InMemoryTokenBlacklist::new()),
            PasswordHasher::new(),
            SecretString::new("test_jwt_secret".into()),
            Duration::hours(1),
            ADMIN_EMAIL.to_string(),
        )
    }

    #[tokio::test]
    async fn sign_up_issues_token_for_created_user() {
        let auth = use_cases(vec![]);

        let (token, user) = auth
            .sign_up("Jane Doe", "jane@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.email, "jane@example.com");

        let requester = auth.authenticate(&token).await.unwrap();
        assert_eq!(requester.id, user.id);
        assert!(!requester.is_admin);
    }

    #[tokio::test]
    async fn sign_up_duplicate_email_conflicts() {
        let existing = create_test_user(|u| u.email = "jane@example.com".into());
        let auth = use_cases(vec![existing]);

        let result = auth
            .sign_up("Jane Doe", "jane@example.com", "password123")
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn sign_up_aggregates_violations() {
        let auth = use_cases(vec![]);

        let err = auth.sign_up("j", "not-an-email", "nope").await.unwrap_err();
        let AppError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("Name"));
        assert!(message.contains("Email"));
        assert!(message.contains("Password"));
    }

    #[tokio::test]
    async fn sign_in_unknown_email_is_not_found() {
        let auth = use_cases(vec![]);

        let result = auth.sign_in("ghost@example.com", "password123").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn sign_in_wrong_password_is_unauthorized() {
        let user = create_test_user(|_| {});
        let email = user.email.clone();
        let auth = use_cases(vec![user]);

        let result = auth.sign_in(&email, "wrong-password").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn sign_in_returns_verifiable_token() {
        let user = create_test_user(|_| {});
        let email = user.email.clone();
        let auth = use_cases(vec![user.clone()]);

        let (token, profile) = auth.sign_in(&email, "password123").await.unwrap();
        assert_eq!(profile.id, user.id);

        let requester = auth.authenticate(&token).await.unwrap();
        assert_eq!(requester.email, email);
    }

    #[tokio::test]
    async fn sign_out_revokes_the_session() {
        let user = create_test_user(|_| {});
        let email = user.email.clone();
        let auth = use_cases(vec![user]);

        let (token, _) = auth.sign_in(&email, "password123").await.unwrap();
        assert!(auth.authenticate(&token).await.is_ok());

        auth.sign_out(&token).await.unwrap();

        let result = auth.authenticate(&token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn sign_out_is_idempotent() {
        let user = create_test_user(|_| {});
        let email = user.email.clone();
        let auth = use_cases(vec![user]);

        let (token, _) = auth.sign_in(&email, "password123").await.unwrap();
        auth.sign_out(&token).await.unwrap();
        auth.sign_out(&token).await.unwrap();

        assert!(matches!(
            auth.authenticate(&token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn sign_out_tolerates_expired_tokens() {
        let user = create_test_user(|_| {});
        let auth = use_cases(vec![user.clone()]);

        let expired = jwt::issue(
            user.id,
            &SecretString::new("test_jwt_secret".into()),
            Duration::hours(-1),
        )
        .unwrap();

        auth.sign_out(&expired).await.unwrap();
    }

    #[tokio::test]
    async fn authenticate_rejects_token_for_deleted_user() {
        let user = create_test_user(|_| {});
        let auth = use_cases(vec![]);

        let token = jwt::issue(
            user.id,
            &SecretString::new("test_jwt_secret".into()),
            Duration::hours(1),
        )
        .unwrap();

        let result = auth.authenticate(&token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn authenticate_flags_admin_by_email_equality() {
        let admin = create_test_user(|u| u.email = ADMIN_EMAIL.into());
        let auth = use_cases(vec![admin.clone()]);

        let (token, _) = auth.sign_in(ADMIN_EMAIL, "password123").await.unwrap();
        let requester = auth.authenticate(&token).await.unwrap();
        assert!(requester.is_admin);
    }
}
