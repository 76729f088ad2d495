//! Resolving the policy principal of a user.

use evento_core::policy::Principal;
use evento_db::db::store::AccountStore;
use evento_db::model::user::User;

use super::casbin::granted_permissions;
use super::subject::ExpandedSubjects;
use crate::error::ServiceResult;

/// ## Summary
/// Builds the principal of `user` from its group memberships and the
/// permission grants Casbin holds for the user and those groups.
///
/// ## Errors
/// Returns an error if loading memberships or enforcing fails.
#[tracing::instrument(skip(accounts, enforcer, user), fields(user_id = %user.id))]
pub async fn load_principal(
    accounts: &dyn AccountStore,
    enforcer: &casbin::Enforcer,
    user: &User,
) -> ServiceResult<Principal> {
    let groups = accounts.groups_for_user(user.id).await?;
    let subjects = ExpandedSubjects::new(user.id, groups.iter().cloned());
    let permissions = granted_permissions(enforcer, &subjects)?;

    let mut principal = Principal::new(user.id, user.username.clone());
    principal.is_superuser = user.is_superuser;
    principal.is_staff = user.is_staff || user.is_superuser;
    principal.permissions = permissions;
    principal.groups = groups.into_iter().collect();

    tracing::debug!(
        groups = principal.groups.len(),
        permissions = ?principal.permissions,
        "Principal resolved"
    );
    Ok(principal)
}
