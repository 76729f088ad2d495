use evento_core::constants::EVENT_LIST_ROUTE;
use evento_db::db::store::AccountStore;
use evento_db::model::user::User;
use serde::Deserialize;

use crate::auth::password::{reject_without_credential, verify_password_blocking};
use crate::auth::session::{IssuedSession, end_session, start_session};
use crate::error::{ServiceError, ServiceResult};
use crate::validation::{NON_FIELD_ERRORS, ValidationErrors};

const BAD_CREDENTIALS: &str = "Incorrect username or password.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn bad_credentials() -> ServiceError {
    ValidationErrors::single(NON_FIELD_ERRORS, BAD_CREDENTIALS).into()
}

/// Maps the outcome of a credential-less check to the login error.
fn rejected(outcome: ServiceResult<()>) -> ServiceError {
    match outcome {
        Err(ServiceError::TaskError(e)) => ServiceError::TaskError(e),
        _ => bad_credentials(),
    }
}

/// ## Summary
/// Checks the credentials and opens a session.
///
/// Unknown users, inactive users and wrong passwords fail the same way and
/// all pay for one Argon2 verification.
///
/// ## Side Effects
/// Inserts a session row.
///
/// ## Errors
/// Returns `Validation` for bad credentials.
#[tracing::instrument(skip(accounts, form), fields(username = %form.username))]
pub async fn login(
    accounts: &dyn AccountStore,
    form: &LoginForm,
    ttl_hours: u32,
) -> ServiceResult<(User, IssuedSession)> {
    let Some(user) = accounts
        .find_user_by_username(form.username.trim())
        .await?
        .filter(|user| user.is_active)
    else {
        tracing::debug!("Login for unknown or inactive user");
        return Err(rejected(reject_without_credential(form.password.clone()).await));
    };

    let Some(hash) = accounts.password_hash(user.id).await? else {
        tracing::warn!(user_id = %user.id, "User has no password credential");
        return Err(rejected(reject_without_credential(form.password.clone()).await));
    };

    match verify_password_blocking(form.password.clone(), hash).await {
        Ok(()) => {}
        Err(ServiceError::NotAuthenticated) => return Err(bad_credentials()),
        Err(e) => return Err(e),
    }

    let session = start_session(accounts, user.id, ttl_hours).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok((user, session))
}

/// ## Summary
/// Ends the session carried by the cookie, if any.
///
/// ## Errors
/// Returns an error if the store fails.
pub async fn logout(accounts: &dyn AccountStore, token: Option<&str>) -> ServiceResult<()> {
    if let Some(token) = token {
        end_session(accounts, token).await?;
        tracing::info!("User logged out");
    }
    Ok(())
}

/// ## Summary
/// Returns the post-login destination: `next` when it is a local path,
/// the event list otherwise.
/// Paths carrying control characters or whitespace are never local.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => EVENT_LIST_ROUTE,
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(|c| c.is_control() || c.is_whitespace())
}
