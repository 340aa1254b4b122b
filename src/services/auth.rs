use std::sync::Arc;

use crate::auth::{
    hash_password, verify_password, JwtKeys, LoginResponse, RegisterResponse,
};
use crate::error::AppError;
use crate::models::NewUser;
use crate::store::UserStore;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const EMAIL_IN_USE: &str = "Email already in use";

/// Registration and login for the identity service.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    /// Creates an account. Fails with `Conflict` if the email is taken.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_IN_USE.into()));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        log::info!("registered user {}", user.uuid);
        Ok(RegisterResponse::from(&user))
    }

    /// Checks credentials and issues an access token.
    ///
    /// An unknown email and a wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            log::warn!("login rejected: unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(password, &user.password_hash)? {
            log::warn!("login rejected for user {}: password mismatch", user.uuid);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let access_token = self.keys.issue(user.uuid, &user.email)?;
        Ok(LoginResponse { access_token })
    }
}
