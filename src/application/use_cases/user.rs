use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::validators,
    domain::entities::user::User,
    infra::crypto::PasswordHasher,
    use_cases::auth::Requester,
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Creates the user atomically with the email-uniqueness check; a
    /// concurrent duplicate registration must fail with `Conflict`.
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<User>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Outbound user shape. The password hash stays behind in the entity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct UserUseCases {
    users: Arc<dyn UserRepo>,
    hasher: PasswordHasher,
}

impl UserUseCases {
    pub fn new(users: Arc<dyn UserRepo>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<UserProfile>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid, requester: &Requester) -> AppResult<UserProfile> {
        ensure_self_or_admin(requester, id)?;
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        Ok(user.into())
    }

    #[instrument(skip_all, fields(user_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        requester: &Requester,
        input: UpdateUserInput,
    ) -> AppResult<UserProfile> {
        ensure_self_or_admin(requester, id)?;

        let mut violations = Vec::new();
        if let Some(name) = input.name.as_deref()
            && !validators::is_valid_name(name)
        {
            violations.push("Name must be between 2 and 100 characters");
        }
        if let Some(email) = input.email.as_deref()
            && !validators::is_valid_email(email)
        {
            violations.push("Email must be a valid email address");
        }
        if let Some(password) = input.password.as_deref()
            && !validators::is_valid_password(password)
        {
            violations.push("Password must be at least 6 characters");
        }
        if !violations.is_empty() {
            return Err(AppError::Validation(violations.join(", ")));
        }

        let password_hash = match input.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let updated = self
            .users
            .update(
                id,
                input.name.as_deref().map(str::trim),
                input.email.as_deref().map(str::trim),
                password_hash.as_deref(),
            )
            .await?;
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid, requester: &Requester) -> AppResult<()> {
        ensure_self_or_admin(requester, id)?;
        self.users.delete(id).await
    }
}

fn ensure_self_or_admin(requester: &Requester, target: Uuid) -> AppResult<()> {
    if requester.id == target || requester.is_admin {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Forbidden: You are not allowed to access this user's data.".into(),
    ))
}
