//! Login sessions.
//!
//! The cookie carries a random token. The store keeps only its SHA-256 hex
//! digest.

use chrono::{DateTime, Utc};
use evento_db::db::store::AccountStore;
use evento_db::model::session::NewSession;
use evento_db::model::user::User;
use sha2::{Digest, Sha256};

use crate::error::{ServiceError, ServiceResult};

/// A freshly issued session: the raw cookie token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// ## Summary
/// Returns the instant a session opened at `now` expires.
///
/// ## Errors
/// Returns `InvalidConfiguration` if the lifetime overflows the calendar.
pub fn session_expiry(now: DateTime<Utc>, ttl_hours: u32) -> ServiceResult<DateTime<Utc>> {
    chrono::Duration::try_hours(i64::from(ttl_hours))
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            ServiceError::InvalidConfiguration(format!("session lifetime of {ttl_hours} hours overflows"))
        })
}

/// ## Summary
/// Creates a session for the user that lasts `ttl_hours`.
///
/// ## Side Effects
/// Sweeps expired sessions, then inserts a session row.
///
/// ## Errors
/// Returns `InvalidConfiguration` if the lifetime overflows, or an error if
/// the store rejects the session.
#[tracing::instrument(skip(accounts))]
pub async fn start_session(
    accounts: &dyn AccountStore,
    user_id: uuid::Uuid,
    ttl_hours: u32,
) -> ServiceResult<IssuedSession> {
    let expires_at = session_expiry(Utc::now(), ttl_hours)?;
    let token = uuid::Uuid::new_v4().simple().to_string();

    sweep_expired_sessions(accounts).await?;
    accounts
        .create_session(&NewSession {
            id: uuid::Uuid::now_v7(),
            token_hash: hash_token(&token),
            user_id,
            expires_at,
        })
        .await?;

    tracing::debug!(%expires_at, "Session started");
    Ok(IssuedSession { token, expires_at })
}

/// ## Summary
/// Returns the active user owning the session token, if any.
///
/// ## Side Effects
/// Deletes the session if it has expired.
///
/// ## Errors
/// Returns an error if the store fails.
pub async fn resolve_session(accounts: &dyn AccountStore, token: &str) -> ServiceResult<Option<User>> {
    let token_hash = hash_token(token);
    let Some(session) = accounts.find_session(&token_hash).await? else {
        tracing::trace!("Unknown session token");
        return Ok(None);
    };

    if session.is_expired_at(Utc::now()) {
        tracing::debug!(user_id = %session.user_id, "Session expired");
        accounts.delete_session(&token_hash).await?;
        return Ok(None);
    }

    Ok(accounts
        .find_user_by_id(session.user_id)
        .await?
        .filter(|user| user.is_active))
}

/// ## Summary
/// Deletes every expired session.
///
/// ## Errors
/// Returns an error if the store fails.
pub async fn sweep_expired_sessions(accounts: &dyn AccountStore) -> ServiceResult<usize> {
    let removed = accounts.delete_expired_sessions(Utc::now()).await?;
    if removed > 0 {
        tracing::debug!(removed, "Removed expired sessions");
    }
    Ok(removed)
}

/// ## Summary
/// Ends the session identified by the cookie token.
///
/// ## Errors
/// Returns an error if the store fails.
pub async fn end_session(accounts: &dyn AccountStore, token: &str) -> ServiceResult<()> {
    accounts.delete_session(&hash_token(token)).await?;
    Ok(())
}
