//! Password hashing
//!
//! bcrypt is CPU bound, so both operations run on the blocking pool.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, PasswordError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    Ok(verified.unwrap_or(false))
}
