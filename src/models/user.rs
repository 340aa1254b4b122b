use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::RegisterResponse;

/// A row of the `users` table.
///
/// `id` is the internal sequence; `uuid` is the identifier handed to
/// clients and embedded as the token subject. `email` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub uuid: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

impl From<&User> for RegisterResponse {
    fn from(user: &User) -> Self {
        RegisterResponse {
            user_id: user.uuid,
            user_email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            uuid: Uuid::new_v4(),
            email: "test@example.com".into(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".into(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());

        let public = RegisterResponse::from(&user);
        assert_eq!(public.user_id, user.uuid);
        assert_eq!(public.user_email, "test@example.com");
        assert_eq!(public.created_at, now);
    }
}
