use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::{ApiClient, ClientError, TokenStorage};
use crate::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub email: String,
}

/// Claims the client reads without verifying the signature.
#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    exp: Option<i64>,
    email: Option<String>,
}

fn peek_claims(token: &str) -> Option<UnverifiedClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

/// A token is expired when its `exp` is missing, unreadable, or not in the future.
pub fn is_token_expired(token: &str) -> bool {
    match peek_claims(token).and_then(|claims| claims.exp) {
        Some(exp) => Utc::now().timestamp() >= exp,
        None => true,
    }
}

/// Holds the signed-in user's token, mirrored into durable storage.
pub struct SessionStore {
    token: Option<String>,
    user: Option<SessionUser>,
    auth_api: ApiClient,
    storage: Box<dyn TokenStorage>,
}

impl SessionStore {
    /// Restores any token left in `storage` by a previous session.
    pub fn new(auth_api: ApiClient, storage: Box<dyn TokenStorage>) -> Result<Self, ClientError> {
        let token = storage.get(TOKEN_KEY)?.filter(|token| !token.is_empty());
        let user = token
            .as_deref()
            .and_then(peek_claims)
            .and_then(|claims| claims.email)
            .map(|email| SessionUser { email });

        Ok(Self {
            token,
            user,
            auth_api,
            storage,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .as_deref()
            .map_or(false, |token| !is_token_expired(token))
    }

    /// Creates the account. Does not sign in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.auth_api.post("/auth/register", &body, None).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.auth_api.post("/auth/login", &body, None).await?;

        self.storage.set(TOKEN_KEY, &response.access_token)?;
        self.token = Some(response.access_token);
        self.user = Some(SessionUser {
            email: email.to_string(),
        });
        log::debug!("signed in as {}", email);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.token = None;
        self.user = None;
        self.storage.remove(TOKEN_KEY)?;
        Ok(())
    }

    /// Drops the session when the token is absent or expired.
    /// Returns whether a usable session remains.
    pub fn ensure(&mut self) -> Result<bool, ClientError> {
        if self.is_authenticated() {
            return Ok(true);
        }
        self.logout()?;
        Ok(false)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.token.is_some())
            .field("user", &self.user)
            .field("auth_api", &self.auth_api.base_url())
            .finish()
    }
}
