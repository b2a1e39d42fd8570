use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Admin account row. The password hash never leaves the process; responses
/// use [`AdminPublic`].
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn to_public(&self) -> AdminPublic {
        AdminPublic {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Wire representation of an admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPublic {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Insert payload. `password_hash` is already hashed by the handler.
#[derive(Debug)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
