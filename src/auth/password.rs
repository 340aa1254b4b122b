use crate::error::AppError;

/// bcrypt work factor for stored password hashes.
pub const HASH_COST: u32 = 10;

/// Salted one-way hash of a new account's password.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// A malformed stored hash is an internal error, not a failed login.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(password, password_hash)?)
}
