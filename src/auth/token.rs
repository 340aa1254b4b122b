use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// The only message a rejected token ever produces. Details go to the log.
pub const TOKEN_REJECTED: &str = "Unauthorized";

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's public identifier.
    pub sub: Uuid,
    /// Email of the user the token was issued to.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signing and verification material for access tokens.
///
/// The identity service issues tokens with it and the todo service verifies
/// them with the same shared secret; neither reads the environment directly.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, expires_in: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Signs an HS256 token for the given user that expires after the configured lifetime.
    pub fn issue(&self, user_uuid: Uuid, email: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp() as usize;
        let exp = usize::try_from(self.expires_in.as_secs())
            .ok()
            .and_then(|lifetime| now.checked_add(lifetime))
            .ok_or_else(|| {
                AppError::InternalServerError("token lifetime overflows the expiry claim".into())
            })?;
        let claims = Claims {
            sub: user_uuid,
            email: email.to_string(),
            iat: now,
            exp,
        };
        self.encode(&claims)
    }

    /// Signs arbitrary claims with this key set.
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry, then decodes the claims.
    ///
    /// A token without `sub` or `email` fails to decode; an empty `email` is
    /// rejected explicitly. Every failure is `AppError::Unauthorized` with
    /// the same `TOKEN_REJECTED` message.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_claims(token).map_err(|e| {
            log::warn!("token rejected: {}", e);
            AppError::Unauthorized(TOKEN_REJECTED.into())
        })?;

        if claims.email.trim().is_empty() {
            log::warn!("token rejected: blank email claim for {}", claims.sub);
            return Err(AppError::Unauthorized(TOKEN_REJECTED.into()));
        }
        Ok(claims)
    }

    fn decode_claims(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;
    use serde_json::json;

    const SECRET: &str = "test_secret_for_tokens";

    fn keys() -> JwtKeys {
        JwtKeys::new(SECRET, Duration::from_secs(900))
    }

    fn now() -> usize {
        chrono::Utc::now().timestamp() as usize
    }

    #[test]
    fn test_token_generation_and_verification() {
        let user = Uuid::new_v4();
        let token = keys().issue(user, "owner@example.com").unwrap();
        let claims = keys().verify(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_token_expiration() {
        let expired = Claims {
            sub: Uuid::new_v4(),
            email: "late@example.com".into(),
            iat: now() - 7200,
            exp: now() - 3600,
        };
        let token = keys().encode(&expired).unwrap();

        let err = keys().decode_claims(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));

        match keys().verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, TOKEN_REJECTED),
            other => panic!("expired token should be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = JwtKeys::new("a_completely_different_secret", Duration::from_secs(900))
            .issue(Uuid::new_v4(), "someone@example.com")
            .unwrap();

        let err = keys().decode_claims(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));

        match keys().verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, TOKEN_REJECTED),
            other => panic!("foreign signature should be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_claims_are_rejected() {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(SECRET.as_bytes());

        let without_email = encode(
            &header,
            &json!({ "sub": Uuid::new_v4(), "iat": now(), "exp": now() + 60 }),
            &key,
        )
        .unwrap();
        assert!(matches!(
            keys().verify(&without_email),
            Err(AppError::Unauthorized(_))
        ));

        let without_subject = encode(
            &header,
            &json!({ "email": "a@example.com", "iat": now(), "exp": now() + 60 }),
            &key,
        )
        .unwrap();
        assert!(matches!(
            keys().verify(&without_subject),
            Err(AppError::Unauthorized(_))
        ));

        let blank_email = encode(
            &header,
            &json!({ "sub": Uuid::new_v4(), "email": "", "iat": now(), "exp": now() + 60 }),
            &key,
        )
        .unwrap();
        match keys().verify(&blank_email) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, TOKEN_REJECTED),
            other => panic!("blank email should be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            keys().verify("not.a.jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_lifetime_overflow_is_an_error() {
        let keys = JwtKeys::new(SECRET, Duration::from_secs(u64::MAX));
        assert!(matches!(
            keys.issue(Uuid::new_v4(), "forever@example.com"),
            Err(AppError::InternalServerError(_))
        ));
    }
}
