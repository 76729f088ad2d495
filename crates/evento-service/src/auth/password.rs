use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use std::sync::LazyLock;

use crate::error::{ServiceError, ServiceResult};

/// Hash verified against when a login has no real credential to check.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("evento-decoy-credential").ok());

/// ## Summary
/// Hashes a password using Argon2id with a random salt.
///
/// ## Errors
/// Returns an error if password hashing fails.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to hash password: {e}")))?;

    Ok(password_hash.to_string())
}

/// ## Summary
/// Verifies a password against a stored Argon2 hash.
///
/// ## Errors
/// Returns `NotAuthenticated` if the password does not match, or
/// `InvalidConfiguration` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> ServiceResult<()> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Invalid password hash: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| {
            tracing::trace!("Password verification failed: {}", err);
            ServiceError::NotAuthenticated
        })
}

/// ## Summary
/// Runs [`hash_password`] on the blocking thread pool.
///
/// ## Errors
/// Returns an error if hashing fails or the blocking task panics.
pub async fn hash_password_blocking(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// ## Summary
/// Runs [`verify_password`] on the blocking thread pool.
///
/// ## Errors
/// Same as [`verify_password`], plus a failure of the blocking task.
pub async fn verify_password_blocking(password: String, password_hash: String) -> ServiceResult<()> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await?
}

/// ## Summary
/// Spends the same Argon2 work as [`verify_password_blocking`] without a
/// stored hash. Always answers `NotAuthenticated`.
///
/// ## Errors
/// Returns `NotAuthenticated`, or a failure of the blocking task.
pub async fn reject_without_credential(password: String) -> ServiceResult<()> {
    tokio::task::spawn_blocking(move || {
        if let Some(decoy) = DECOY_HASH.as_deref() {
            // A match against the decoy still rejects.
            if verify_password(&password, decoy).is_ok() {
                tracing::trace!("Password matched the decoy credential");
            }
        }
    })
    .await?;
    Err(ServiceError::NotAuthenticated)
}
