use chrono::{DateTime, Utc};
use uuid::Uuid;

// Never derives Serialize: the password hash must not be able to leak into a
// response body. Outbound shapes go through UserProfile instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
