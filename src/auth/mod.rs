pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, JwtKeys};

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Previously registered email address.
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    /// Unique email address for the new account.
    #[validate(email)]
    pub email: String,
    /// Plaintext password; only its bcrypt hash is stored.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Public view of a freshly registered user. Never carries the hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub user_email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Response after a successful login.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_credentials_rules() {
        assert!(credentials("dana@example.com", "secret").validate().is_ok());
        assert!(credentials("dana.example.com", "secret").validate().is_err());
        assert!(credentials("dana@example.com", "five5").validate().is_err());

        let login = LoginRequest {
            email: "dana@example.com".into(),
            password: "".into(),
        };
        assert!(login.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let body = json!({ "email": "dana@example.com", "password": "secret", "admin": true });
        assert!(serde_json::from_value::<RegisterRequest>(body.clone()).is_err());
        assert!(serde_json::from_value::<LoginRequest>(body).is_err());
    }

    #[test]
    fn test_register_response_shape() {
        let response = RegisterResponse {
            user_id: Uuid::nil(),
            user_email: "dana@example.com".into(),
            created_at: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["user_id"], Uuid::nil().to_string());
        assert_eq!(value["user_email"], "dana@example.com");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
