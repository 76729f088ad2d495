use crate::types::PermissionTag;

use super::{AccessTarget, AuthzResult, Operation, Principal, QueryScope};

/// Superuser or holder of `events.manage`.
#[must_use]
pub fn is_admin(principal: &Principal) -> bool {
    principal.is_superuser || principal.has_permission(PermissionTag::ManageEvents)
}

/// Superuser or holder of `events.organize`.
#[must_use]
pub fn is_organizer(principal: &Principal) -> bool {
    principal.is_superuser || principal.has_permission(PermissionTag::OrganizeEvents)
}

/// ## Summary
/// Visibility predicate. Listing and single-event access both go through it.
#[must_use]
pub fn can_view<T: AccessTarget + ?Sized>(principal: &Principal, event: &T) -> bool {
    !event.is_private()
        || event.organizer_id() == principal.id
        || event.has_attendee(principal.id)
        || principal.is_superuser
}

/// ## Summary
/// Which events the public event list covers for this principal.
///
/// There is no role that sees less than the public events.
#[must_use]
pub fn list_scope(principal: &Principal) -> QueryScope {
    if is_admin(principal) {
        QueryScope::All
    } else {
        QueryScope::MineAndPublic
    }
}

#[must_use]
pub fn can_create(principal: &Principal) -> bool {
    is_organizer(principal)
}

/// ## Summary
/// Administrators edit anything; organizers edit the events they organize.
#[must_use]
pub fn can_edit<T: AccessTarget + ?Sized>(principal: &Principal, event: &T) -> bool {
    is_admin(principal)
        || (principal.has_permission(PermissionTag::OrganizeEvents)
            && event.organizer_id() == principal.id)
}

/// ## Summary
/// Deleting is administrative only. Organizing an event does not allow
/// deleting it.
#[must_use]
pub fn can_delete<T: AccessTarget + ?Sized>(principal: &Principal, _event: &T) -> bool {
    is_admin(principal)
}

#[must_use]
pub const fn can_access_admin(principal: &Principal) -> bool {
    principal.is_staff || principal.is_superuser
}

/// ## Summary
/// Which events the administration panel lists for this principal.
#[must_use]
pub fn admin_scope(principal: &Principal) -> QueryScope {
    if is_admin(principal) {
        QueryScope::All
    } else if principal.has_permission(PermissionTag::OrganizeEvents) {
        QueryScope::Organized
    } else {
        QueryScope::Nothing
    }
}

#[must_use]
pub const fn can_manage_accounts(principal: &Principal) -> bool {
    principal.is_superuser
}

/// ## Summary
/// Evaluates an operation against the rule for its kind.
#[must_use]
pub fn check<T: AccessTarget + ?Sized>(
    principal: &Principal,
    operation: &Operation<'_, T>,
) -> AuthzResult {
    let allowed = match operation {
        Operation::View(event) => can_view(principal, *event),
        Operation::Create => can_create(principal),
        Operation::Edit(event) => can_edit(principal, *event),
        Operation::Delete(event) => can_delete(principal, *event),
        Operation::Admin => can_access_admin(principal),
        Operation::ManageAccounts => can_manage_accounts(principal),
    };
    AuthzResult::from(allowed)
}
