use evento_core::config::BootstrapAdminConfig;
use evento_core::constants::ATTENDEES_GROUP;
use evento_db::db::store::AccountStore;
use evento_db::model::user::{NewAccount, User};

use crate::auth::password::hash_password_blocking;
use crate::error::ServiceResult;

/// ## Summary
/// Ensures the configured superuser exists.
///
/// An existing account with the same username is left untouched.
///
/// ## Side Effects
/// Creates the user, its password credential and its attendees membership
/// when missing.
///
/// ## Errors
/// Returns an error if the store fails or the password cannot be hashed.
#[tracing::instrument(skip(accounts, config), fields(username = %config.username))]
pub async fn ensure_bootstrap_admin(
    accounts: &dyn AccountStore,
    config: &BootstrapAdminConfig,
) -> ServiceResult<User> {
    if let Some(user) = accounts.find_user_by_username(&config.username).await? {
        if !user.is_superuser {
            tracing::warn!(
                user_id = %user.id,
                "Bootstrap admin username belongs to a non-superuser account"
            );
        }
        tracing::debug!("Bootstrap admin already exists");
        return Ok(user);
    }

    let account = NewAccount {
        username: config.username.clone(),
        email: config.email.clone(),
        is_superuser: true,
        is_staff: true,
        ..NewAccount::default()
    };
    let hash = hash_password_blocking(config.password.clone()).await?;
    let user = accounts.create_user(&account, &hash).await?;
    accounts.add_to_group(user.id, ATTENDEES_GROUP).await?;

    tracing::info!(user_id = %user.id, "Bootstrap admin created");
    Ok(user)
}
