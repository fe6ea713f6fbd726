use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::user::User,
    use_cases::user::UserRepo,
};

// User row as stored in the db.
#[derive(sqlx::FromRow, Debug)]
struct UserDb {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserDb> for User {
    fn from(rec: UserDb) -> Self {
        User {
            id: rec.id,
            name: rec.name,
            email: rec.email,
            password_hash: rec.password_hash,
            created_at: rec.created_at,
            updated_at: rec.updated_at,
        }
    }
}

const USER_COLS: &str = "id, name, email, password_hash, created_at, updated_at";

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
        // Existence check and insert run inside one transaction so two
        // concurrent sign-ups with the same email cannot both commit; the
        // unique index on email backstops the race either way.
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::from)?;
        if existing.is_some() {
            // Dropping the transaction rolls it back.
            return Err(AppError::Conflict("User already exists".into()));
        }

        let rec = sqlx::query_as::<_, UserDb>(&format!(
            "INSERT INTO users (id, name, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict("User already exists".into()),
            other => other,
        })?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(rec.into())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let rec = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let rec = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec.map(User::from))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let recs = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(recs.into_iter().map(User::from).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        let rec = sqlx::query_as::<_, UserDb>(&format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                password_hash = COALESCE($4, password_hash), \
                updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1 RETURNING {USER_COLS}"
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        Ok(rec.into())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}
