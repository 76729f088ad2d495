use evento_core::policy::{Action, Principal, can_manage_accounts};
use evento_db::db::store::AccountStore;
use evento_db::model::user::User;

use crate::error::{ServiceError, ServiceResult};
use crate::validation::ValidationErrors;

const GROUP_NAME_MAX_LEN: usize = 150;

fn require_account_manager(actor: &Principal) -> ServiceResult<()> {
    if can_manage_accounts(actor) {
        Ok(())
    } else {
        tracing::debug!(actor = %actor.id, "Account management denied");
        Err(ServiceError::Denied(Action::ManageAccounts))
    }
}

fn validate_group_name(group: &str) -> ServiceResult<()> {
    let valid = !group.is_empty()
        && group.chars().count() <= GROUP_NAME_MAX_LEN
        && group
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(ValidationErrors::single("group", "Enter a valid group name.").into())
    }
}

async fn existing_user(accounts: &dyn AccountStore, user_id: uuid::Uuid) -> ServiceResult<User> {
    accounts
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))
}

/// ## Summary
/// Adds a user to a group. Permission grants of the group apply from the
/// user's next request.
///
/// ## Errors
/// Returns `Denied` unless the actor is a superuser, `NotFound` for an
/// unknown user and `Validation` for a malformed group name.
#[tracing::instrument(skip(accounts, actor), fields(actor = %actor.id))]
pub async fn assign_group(
    accounts: &dyn AccountStore,
    actor: &Principal,
    user_id: uuid::Uuid,
    group: &str,
) -> ServiceResult<()> {
    require_account_manager(actor)?;
    validate_group_name(group)?;
    existing_user(accounts, user_id).await?;

    accounts.add_to_group(user_id, group).await?;
    tracing::info!("Group membership granted");
    Ok(())
}

/// ## Summary
/// Removes a user from a group. Returns `false` if it was not a member.
///
/// ## Errors
/// Same as [`assign_group`].
#[tracing::instrument(skip(accounts, actor), fields(actor = %actor.id))]
pub async fn revoke_group(
    accounts: &dyn AccountStore,
    actor: &Principal,
    user_id: uuid::Uuid,
    group: &str,
) -> ServiceResult<bool> {
    require_account_manager(actor)?;
    validate_group_name(group)?;
    existing_user(accounts, user_id).await?;

    let removed = accounts.remove_from_group(user_id, group).await?;
    tracing::info!(removed, "Group membership revoked");
    Ok(removed)
}

/// ## Summary
/// Grants or revokes admin panel access.
///
/// ## Errors
/// Returns `Denied` unless the actor is a superuser and `NotFound` for an
/// unknown user.
#[tracing::instrument(skip(accounts, actor), fields(actor = %actor.id))]
pub async fn set_staff(
    accounts: &dyn AccountStore,
    actor: &Principal,
    user_id: uuid::Uuid,
    is_staff: bool,
) -> ServiceResult<User> {
    require_account_manager(actor)?;
    accounts
        .set_staff(user_id, is_staff)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))
}
